//! Solver configuration: which search strategy to run and its tuning.

use serde::{Deserialize, Serialize};

/// Tuning of the artificial potential field strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialFieldConfig {
    /// Largest rotation (radians) applied per step by the vantage-angle force.
    #[serde(default = "default_vantage_step")]
    pub vantage_step: f32,
    /// Exponent `n` of the `(1 - occlusion^n)` damping on the projection-size force.
    #[serde(default = "default_occlusion_damping")]
    pub occlusion_damping_exponent: i32,
}

fn default_vantage_step() -> f32 {
    0.2
}

fn default_occlusion_damping() -> i32 {
    8
}

impl Default for PotentialFieldConfig {
    fn default() -> Self {
        Self {
            vantage_step: default_vantage_step(),
            occlusion_damping_exponent: default_occlusion_damping(),
        }
    }
}

/// Tuning of the particle swarm strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSwarmConfig {
    /// Velocity inertia.
    #[serde(default = "default_inertia")]
    pub inertia: f32,
    /// Attraction toward the particle's personal best.
    #[serde(default = "default_acceleration")]
    pub cognitive: f32,
    /// Attraction toward the global best.
    #[serde(default = "default_acceleration")]
    pub social: f32,
    /// Number of particles.
    #[serde(default = "default_population")]
    pub population_size: usize,
    /// Per-frame probability that a particle is scattered to a random pose.
    #[serde(default = "default_reseed_probability")]
    pub reseed_probability: f32,
}

fn default_inertia() -> f32 {
    0.7298
}

fn default_acceleration() -> f32 {
    2.05
}

fn default_population() -> usize {
    30
}

fn default_reseed_probability() -> f32 {
    0.1
}

impl Default for ParticleSwarmConfig {
    fn default() -> Self {
        Self {
            inertia: default_inertia(),
            cognitive: default_acceleration(),
            social: default_acceleration(),
            population_size: default_population(),
            reseed_probability: default_reseed_probability(),
        }
    }
}

/// Tuning of the genetic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Fraction of the sorted population kept as breeding stock.
    #[serde(default = "default_selection")]
    pub selection: f32,
    /// Probability that a bred individual is mutated.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Probability that a breeding pair is crossed over.
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f32,
    /// Number of individuals.
    #[serde(default = "default_population")]
    pub population_size: usize,
    /// Number of top individuals carried over unchanged.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
    /// Mutation radius as a fraction of the subjects' bounding radius.
    #[serde(default = "default_mutation_strength")]
    pub mutation_strength: f32,
}

fn default_selection() -> f32 {
    0.6
}

fn default_mutation_rate() -> f32 {
    0.7
}

fn default_crossover_rate() -> f32 {
    0.7
}

fn default_elitism() -> usize {
    2
}

fn default_mutation_strength() -> f32 {
    0.5
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            selection: default_selection(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            population_size: default_population(),
            elitism: default_elitism(),
            mutation_strength: default_mutation_strength(),
        }
    }
}

/// Search strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StrategyConfig {
    /// Force-guided random perturbation of the incumbent.
    PotentialField(PotentialFieldConfig),
    /// Pure random perturbation of the incumbent.
    HillClimber,
    /// Particle swarm optimisation.
    ParticleSwarm(ParticleSwarmConfig),
    /// Generational genetic algorithm.
    Genetic(GeneticConfig),
    /// Particle swarm interleaved with potential field frames on stagnation.
    Greedy(ParticleSwarmConfig),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::PotentialField(PotentialFieldConfig::default())
    }
}

/// Full solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl SolverConfig {
    /// Validate strategy parameters.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        match &self.strategy {
            StrategyConfig::PotentialField(field) => {
                if !(field.vantage_step > 0.0) {
                    return Err(SolverConfigError::InvalidParameter(
                        "vantage_step must be positive".into(),
                    ));
                }
                if field.occlusion_damping_exponent < 1 {
                    return Err(SolverConfigError::InvalidParameter(
                        "occlusion_damping_exponent must be at least 1".into(),
                    ));
                }
            }
            StrategyConfig::HillClimber => {}
            StrategyConfig::ParticleSwarm(swarm) | StrategyConfig::Greedy(swarm) => {
                if swarm.population_size < 1 {
                    return Err(SolverConfigError::InvalidPopulation(swarm.population_size));
                }
                check_unit("reseed_probability", swarm.reseed_probability)?;
            }
            StrategyConfig::Genetic(genetic) => {
                if genetic.population_size < 2 {
                    return Err(SolverConfigError::InvalidPopulation(genetic.population_size));
                }
                if genetic.elitism > genetic.population_size {
                    return Err(SolverConfigError::InvalidParameter(format!(
                        "elitism {} exceeds population {}",
                        genetic.elitism, genetic.population_size
                    )));
                }
                check_unit("selection", genetic.selection)?;
                check_unit("mutation_rate", genetic.mutation_rate)?;
                check_unit("crossover_rate", genetic.crossover_rate)?;
            }
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), SolverConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SolverConfigError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

/// Solver configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum SolverConfigError {
    #[error("Population size {0} is too small")]
    InvalidPopulation(usize),
    #[error("Invalid solver parameter: {0}")]
    InvalidParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_potential_field() {
        let config = SolverConfig::default();
        assert!(matches!(config.strategy, StrategyConfig::PotentialField(_)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategy_tag_parsing() {
        let config: SolverConfig =
            serde_json::from_str(r#"{ "strategy": { "type": "Genetic", "elitism": 4 }, "random_seed": 7 }"#)
                .unwrap();
        let StrategyConfig::Genetic(genetic) = config.strategy else {
            panic!("expected genetic strategy");
        };
        assert_eq!(genetic.elitism, 4);
        assert_eq!(genetic.population_size, 30);
        assert_eq!(config.random_seed, Some(7));

        let config: SolverConfig =
            serde_json::from_str(r#"{ "strategy": { "type": "HillClimber" } }"#).unwrap();
        assert_eq!(config.strategy, StrategyConfig::HillClimber);
    }

    #[test]
    fn test_validation_rejects_bad_rates() {
        let config = SolverConfig {
            strategy: StrategyConfig::Genetic(GeneticConfig {
                mutation_rate: 1.5,
                ..Default::default()
            }),
            random_seed: None,
        };
        assert!(config.validate().is_err());

        let config = SolverConfig {
            strategy: StrategyConfig::ParticleSwarm(ParticleSwarmConfig {
                population_size: 0,
                ..Default::default()
            }),
            random_seed: None,
        };
        assert!(matches!(
            config.validate(),
            Err(SolverConfigError::InvalidPopulation(0))
        ));
    }
}
