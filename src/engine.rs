//! GA engine: seeding, the generation loop and model aggregation
//!
//! One composite run: seed, then per generation assign rank fitness,
//! select and mate, mutate, repair, rescore and sort. The final
//! population is reduced to its unique members, rescored and folded into
//! a composite model. A full run repeats this `composite_runs` times and
//! amalgamates one representative per run.

use crate::candidate::{Candidate, Population, PopulationStats};
use crate::config::{GaConfig, Representative};
use crate::data::ReplicateSet;
use crate::error::{GaError, Result};
use crate::likelihood::{score_population, LikelihoodEvaluator};
use crate::model::{amalgamated_model, composite_model, Model};
use crate::operators::{assign_rank_fitness, select_next_generation, MutationRules};
use crate::repair::repair_population;
use crate::seeding::seed_population;
use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Snapshot of one generation after scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_log_likelihood: f64,
    pub unique_count: usize,
    pub stats: PopulationStats,
}

/// Result of a single seeded GA run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeRun {
    pub run: usize,
    pub model: Model,
    /// Unique final candidates, rescored and sorted best-first
    pub final_population: Population,
    /// Candidate handed on to the amalgamated model
    pub representative: Candidate,
    pub initial_unique_count: usize,
    pub history: Vec<GenerationRecord>,
}

/// Everything produced by a full multi-run search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub data_name: String,
    pub entity_names: Vec<String>,
    pub config: GaConfig,
    pub composites: Vec<CompositeRun>,
    /// One representative per run, rescored against each other
    pub representatives: Population,
    pub amalgamated: Model,
}

impl GaReport {
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub struct Engine<'a> {
    config: GaConfig,
    evaluator: LikelihoodEvaluator<'a>,
    mutation: MutationRules,
}

impl<'a> Engine<'a> {
    pub fn new(config: GaConfig, data: &'a ReplicateSet) -> Result<Self> {
        config.validate()?;
        if config.gene_count != data.entity_count() {
            return Err(GaError::Config(format!(
                "gene_count {} does not match the {} entities of '{}'",
                config.gene_count,
                data.entity_count(),
                data.name()
            )));
        }
        let evaluator = LikelihoodEvaluator::new(data, config.paradigm)?;
        let mutation = config.mutation_rules()?;
        Ok(Self {
            config,
            evaluator,
            mutation,
        })
    }

    /// Seed and evolve one population, then build its composite model
    pub fn run_composite<R: Rng + ?Sized>(&self, run: usize, rng: &mut R) -> Result<CompositeRun> {
        let cfg = &self.config;
        let survivors = cfg.survivor_count();

        let mut population = seed_population(
            cfg.population_size,
            cfg.gene_count,
            cfg.ones_percentage,
            &self.evaluator,
            cfg.on_numerical_error,
            cfg.uniqueness,
            rng,
        )?;
        let initial_unique_count = population.unique_count(cfg.uniqueness);
        info!(
            "Run {} seeded: {} candidates, {} unique",
            run,
            population.len(),
            initial_unique_count
        );

        let mut history = Vec::with_capacity(cfg.generations);
        for generation in 0..cfg.generations {
            assign_rank_fitness(&mut population);
            let mut next = select_next_generation(
                &population,
                survivors,
                cfg.selection_probability,
                cfg.uniqueness,
                rng,
            );
            self.mutation.mutate_population(&mut next, rng);
            repair_population(&mut next, rng)?;
            score_population(&mut next, &self.evaluator, cfg.on_numerical_error)?;
            population = next;

            let record = GenerationRecord {
                generation,
                best_log_likelihood: population
                    .best()
                    .and_then(|c| c.log_likelihood)
                    .unwrap_or(f64::NEG_INFINITY),
                unique_count: population.unique_count(cfg.uniqueness),
                stats: population.stats(),
            };
            if generation % cfg.log_interval == 0 || generation + 1 == cfg.generations {
                info!(
                    "  run={} | generation={:>4} | best logL={:.4} | unique={}",
                    run, generation, record.best_log_likelihood, record.unique_count
                );
            }
            history.push(record);
        }

        let mut final_population: Population = population.uniques(cfg.uniqueness).into();
        score_population(&mut final_population, &self.evaluator, cfg.on_numerical_error)?;
        assign_rank_fitness(&mut final_population);
        let model = composite_model(&final_population.candidates, cfg.paradigm)?;

        let representative = match cfg.representative {
            Representative::Weakest => final_population.candidates.last(),
            Representative::Best => final_population.best(),
        }
        .ok_or(GaError::EmptyPopulation("run finished without candidates"))?
        .offspring();

        info!(
            "Run {} complete: {} unique candidates | representative has {} edges",
            run,
            final_population.len(),
            representative.edge_count()
        );

        Ok(CompositeRun {
            run,
            model,
            final_population,
            representative,
            initial_unique_count,
            history,
        })
    }

    /// Every composite run followed by the amalgamated model
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GaReport> {
        let started_at = Utc::now();
        let data = self.evaluator.data();
        info!(
            "Searching '{}' ({} entities, {} replicates x {} time points) | paradigm={} | runs={} | generations={}",
            data.name(),
            data.entity_count(),
            data.replicate_count(),
            data.time_points(),
            self.config.paradigm,
            self.config.composite_runs,
            self.config.generations,
        );

        let mut composites = Vec::with_capacity(self.config.composite_runs);
        for run in 1..=self.config.composite_runs {
            composites.push(self.run_composite(run, rng)?);
        }

        let mut representatives: Population = composites
            .iter()
            .map(|c| c.representative.clone())
            .collect::<Vec<_>>()
            .into();
        score_population(
            &mut representatives,
            &self.evaluator,
            self.config.on_numerical_error,
        )?;
        let amalgamated = amalgamated_model(&representatives.candidates, self.config.paradigm)?;

        let finished_at = Utc::now();
        info!(
            "Search complete in {}s: {} composite models amalgamated",
            (finished_at - started_at).num_seconds(),
            composites.len()
        );

        Ok(GaReport {
            started_at,
            finished_at,
            data_name: data.name().to_string(),
            entity_names: data.entity_names().to_vec(),
            config: self.config.clone(),
            composites,
            representatives,
            amalgamated,
        })
    }
}

/// Size the global rayon pool used by scoring and repair. Must run before
/// any parallel work.
pub fn configure_threads(threads: Option<usize>) -> Result<()> {
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| GaError::Config(format!("Failed to configure thread pool: {}", e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::UniquenessCriterion;
    use crate::likelihood::{FailurePolicy, Paradigm};
    use crate::repair::check_legal;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn data(entities: usize) -> ReplicateSet {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        ReplicateSet::synthetic(&mut rng, 3, 8, entities, 2, 0.85).unwrap()
    }

    fn small_config(paradigm: Paradigm) -> GaConfig {
        GaConfig {
            population_size: 16,
            gene_count: 5,
            ones_percentage: 20,
            paradigm,
            generations: 4,
            composite_runs: 2,
            log_interval: 2,
            on_numerical_error: FailurePolicy::Penalize,
            ..GaConfig::default()
        }
    }

    #[test]
    fn test_gene_count_must_match_data() {
        let data = data(4);
        assert!(matches!(
            Engine::new(small_config(Paradigm::Cotemporal), &data),
            Err(GaError::Config(_))
        ));
    }

    #[test]
    fn test_composite_run() {
        let data = data(5);
        let engine = Engine::new(small_config(Paradigm::NextStepOne), &data).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let run = engine.run_composite(1, &mut rng).unwrap();

        assert_eq!(run.history.len(), 4);
        assert!(run.history.iter().all(|r| r.stats.size == 16));
        assert!(!run.final_population.is_empty());
        assert_eq!(
            run.final_population.len(),
            run.final_population.unique_count(UniquenessCriterion::RelativeLikelihood)
        );
        for c in run.final_population.iter() {
            check_legal(&c.genes).unwrap();
        }
        let fitness: f64 = run.final_population.iter().map(|c| c.fitness.unwrap()).sum();
        assert!((fitness - 1.0).abs() < 1e-9);
        assert_eq!(
            run.representative.genes,
            run.final_population.candidates.last().unwrap().genes
        );
        assert_eq!(run.model.size(), 5);
        for i in 0..5 {
            for j in 0..5 {
                let w = run.model.get(i, j);
                assert!((0.0..=1.0 + 1e-9).contains(&w));
            }
        }
    }

    #[test]
    fn test_full_run_is_reproducible() {
        let data = data(5);
        let engine = Engine::new(small_config(Paradigm::Cotemporal), &data).unwrap();
        let a = engine.run(&mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let b = engine.run(&mut ChaCha8Rng::seed_from_u64(11)).unwrap();

        assert_eq!(a.composites.len(), 2);
        assert_eq!(a.representatives.len(), 2);
        assert_eq!(a.amalgamated, b.amalgamated);
        assert_eq!(a.entity_names, data.entity_names());
        let rel: f64 = a
            .representatives
            .iter()
            .map(|c| c.relative_likelihood.unwrap())
            .sum();
        assert!((rel - 1.0).abs() < 1e-6);
        // cotemporal models are symmetric
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(a.amalgamated.get(i, j), a.amalgamated.get(j, i));
            }
        }
    }

    #[test]
    fn test_best_representative() {
        let data = data(5);
        let config = GaConfig {
            representative: Representative::Best,
            generations: 1,
            composite_runs: 1,
            ..small_config(Paradigm::NextStepOneTwo)
        };
        let engine = Engine::new(config, &data).unwrap();
        let run = engine.run_composite(1, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(run.representative.genes, run.final_population[0].genes);
    }
}
