//! # explicit-rs: Explicit-State Model Construction
//!
//! **`explicit-rs`** turns an implicitly described probabilistic system into an explicit,
//! finite **sparse model**: a row-grouped transition matrix together with state labels,
//! reward models and (optionally) choice labels, Markovian states and state valuations.
//! It is the front half of a probabilistic model checker.
//!
//! ## How it works
//!
//! The system is described by a [`NextStateGenerator`][crate::generator::NextStateGenerator]:
//! it yields initial states and, for each state, the alternatives (choices) leading to
//! successor states with probabilities or rates.
//! The [`ExplicitModelBuilder`][crate::builder::ExplicitModelBuilder] explores every reachable
//! state exactly once, assigns dense ids, and appends one **row group** per state to the matrix.
//!
//! ## Key Features
//!
//! - **Four model classes**: DTMC, CTMC, MDP and Markov automata (see [`ModelType`][crate::types::ModelType]).
//! - **Pluggable exploration order**: breadth-first, depth-first or any custom [`Frontier`][crate::frontier::Frontier].
//!   The final numbering is always the expansion order, and every per-state vector agrees with it.
//! - **Compact states**: states are bit-packed [`CompressedState`][crate::state::CompressedState]s, deduplicated
//!   in a hash-consing [`StateStorage`][crate::registry::StateStorage].
//! - **Typed failures**: every build either returns a complete model or a [`BuildError`][crate::error::BuildError].
//! - **Parallel expansion**: expansion of frontier batches on scoped worker threads, with deterministic results.
//!
//! ## Basic Usage
//!
//! ```rust
//! use explicit_rs::builder::ExplicitModelBuilder;
//! use explicit_rs::error::GeneratorError;
//! use explicit_rs::generator::{Choice, NextStateGenerator, StateBehavior};
//! use explicit_rs::state::{CompressedState, Valuation};
//! use explicit_rs::types::ModelType;
//!
//! // A fair coin flipped until it shows heads: state 0 = flipping, state 1 = heads.
//! struct Coin;
//!
//! impl NextStateGenerator for Coin {
//!     fn model_type(&self) -> ModelType {
//!         ModelType::Dtmc
//!     }
//!     fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
//!         Ok(vec![CompressedState::from_u64(0)])
//!     }
//!     fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
//!         let choice = match state.as_words()[0] {
//!             0 => Choice::new()
//!                 .with_successor(CompressedState::from_u64(0), 0.5)
//!                 .with_successor(CompressedState::from_u64(1), 0.5),
//!             _ => Choice::new().with_successor(state.clone(), 1.0),
//!         };
//!         Ok(StateBehavior::new().with_choice(choice))
//!     }
//!     fn decode(&self, _state: &CompressedState) -> Result<Valuation, GeneratorError> {
//!         Ok(Valuation::new())
//!     }
//! }
//!
//! let model = ExplicitModelBuilder::new(Coin).build().unwrap();
//! assert_eq!(model.state_count(), 2);
//! assert_eq!(model.transition_matrix.get(0, 1), Some(0.5));
//! assert_eq!(model.transition_matrix.get(1, 1), Some(1.0));
//! ```
//!
//! ## Core Components
//!
//! - **[`builder`]**: The exploration loop and the [`ModelComponents`][crate::builder::ModelComponents] bundle.
//! - **[`generator`]**: The interface model front-ends implement.
//! - **[`matrix`]**: Compressed sparse rows with row groups.
//! - **[`markovian`]**: Normalization of Markovian choices in Markov automata.

pub mod bitvector;
pub mod builder;
pub mod error;
pub mod frontier;
pub mod generator;
pub mod labeling;
pub mod markovian;
pub mod matrix;
pub mod registry;
pub mod remap;
pub mod rewards;
pub mod state;
pub mod types;
pub mod utils;
