//! Genetic operators: mutation, crossover and rank-based selection

mod crossover;
mod mutation;
mod selection;

pub use crossover::crossover;
pub use mutation::MutationRules;
pub use selection::{
    assign_rank_fitness, cumulative_fitness, roulette_index, select_next_generation,
    survivor_count,
};
