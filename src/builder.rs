//! Explicit model construction.
//!
//! The [`ExplicitModelBuilder`] explores the reachable state space of a
//! [`NextStateGenerator`] and materializes it as [`ModelComponents`]: a
//! row-grouped transition matrix plus state labeling, reward models and the
//! optional choice labeling, Markovian states and state valuations.
//!
//! # Exploration
//!
//! ```text
//!            +-------------- push new ids -------------+
//!            v                                         |
//!   [ Frontier ] --pop--> expand(state) --> register successors --> append row group
//! ```
//!
//! 1. The frontier is seeded with the initial states.
//! 2. While the frontier is non-empty, a state is popped and expanded. Every
//!    successor is registered (and pushed if unseen) *before* the row that
//!    references it is appended, so rows never refer to unknown states.
//! 3. On an empty frontier the build finalizes: matrix columns are remapped
//!    to the final numbering if the frontier expanded out of discovery order,
//!    Markovian choices are normalized, and the bundle is assembled.
//!
//! The final id of a state is the index of its row group, i.e. its position
//! in expansion order. Per-state data (state rewards, labels) is recorded in
//! that order directly; data keyed by discovery id (matrix columns, initial
//! states, valuations) is rewritten once through the [`Remapping`].
//!
//! A build is all-or-nothing: on error no partial model is returned and the
//! builder ends in [`BuildPhase::Failed`].

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{debug, info, trace};

use crate::bitvector::BitVector;
use crate::error::{BuildError, ConfigurationError, GeneratorError, ModelingInconsistency, ResourceExhaustion};
use crate::frontier::{ExplorationOrder, Frontier};
use crate::generator::{Choice, NextStateGenerator, RewardModelInfo, StateBehavior};
use crate::labeling::{ChoiceLabeling, StateLabeling, StateValuations};
use crate::markovian::{normalize, MarkovianPolicy};
use crate::matrix::{SparseMatrix, SparseMatrixBuilder};
use crate::registry::StateStorage;
use crate::remap::Remapping;
use crate::rewards::{RewardModel, RewardModelBuilder};
use crate::state::CompressedState;
use crate::types::{ModelType, StateId};

/// States handed to each worker per parallel batch.
const BATCH_PER_WORKER: usize = 64;

/// Which reward models to build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RewardModelSelection {
    /// Every reward model the generator declares.
    #[default]
    All,
    /// No reward model.
    None,
    /// Exactly the named models; unknown names fail the build before exploration.
    Named(Vec<String>),
}

/// What to do with states (or choices) without successors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DeadlockPolicy {
    /// Fail the build with [`GeneratorError::Deadlock`].
    Fail,
    /// Insert a self-loop with value one.
    #[default]
    SelfLoop,
}

/// Cooperative cancellation flag, checked once per frontier iteration.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the running build to stop.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears a previous request so the signal can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Options of a build.
#[derive(Debug, Clone)]
pub struct Options {
    pub exploration_order: ExplorationOrder,
    /// Keep the full variable valuation of every state.
    pub build_state_valuations: bool,
    /// Keep the label ids of every choice.
    pub build_choice_labels: bool,
    pub reward_models: RewardModelSelection,
    pub deadlock_policy: DeadlockPolicy,
    pub markovian_policy: MarkovianPolicy,
    /// Require probabilistic choices to be distributions.
    pub check_probabilities: bool,
    /// Precision of the distribution check.
    pub tolerance: f64,
    pub max_states: Option<usize>,
    pub max_entries: Option<usize>,
    pub abort: Option<AbortSignal>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            exploration_order: ExplorationOrder::BreadthFirst,
            build_state_valuations: false,
            build_choice_labels: false,
            reward_models: RewardModelSelection::All,
            deadlock_policy: DeadlockPolicy::SelfLoop,
            markovian_policy: MarkovianPolicy::Fail,
            check_probabilities: true,
            tolerance: 1e-6,
            max_states: None,
            max_entries: None,
            abort: None,
        }
    }
}

impl Options {
    pub fn with_exploration_order(mut self, order: ExplorationOrder) -> Self {
        self.exploration_order = order;
        self
    }

    pub fn with_state_valuations(mut self, enabled: bool) -> Self {
        self.build_state_valuations = enabled;
        self
    }

    pub fn with_choice_labels(mut self, enabled: bool) -> Self {
        self.build_choice_labels = enabled;
        self
    }

    pub fn with_reward_models(mut self, selection: RewardModelSelection) -> Self {
        self.reward_models = selection;
        self
    }

    pub fn with_deadlock_policy(mut self, policy: DeadlockPolicy) -> Self {
        self.deadlock_policy = policy;
        self
    }

    pub fn with_markovian_policy(mut self, policy: MarkovianPolicy) -> Self {
        self.markovian_policy = policy;
        self
    }

    pub fn with_probability_check(mut self, enabled: bool) -> Self {
        self.check_probabilities = enabled;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_states(mut self, limit: usize) -> Self {
        self.max_states = Some(limit);
        self
    }

    pub fn with_max_entries(mut self, limit: usize) -> Self {
        self.max_entries = Some(limit);
        self
    }

    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigurationError::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }
}

/// The components of a built model. All per-state data is indexed by final state id.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComponents {
    pub model_type: ModelType,
    pub transition_matrix: SparseMatrix,
    pub state_labeling: StateLabeling,
    pub reward_models: BTreeMap<String, RewardModel>,
    /// Label ids per matrix row, if requested.
    pub choice_labeling: Option<ChoiceLabeling>,
    /// States with a Markovian choice (Markov automata only).
    pub markovian_states: Option<BitVector>,
    pub initial_states: Vec<StateId>,
    /// States that received a self-loop under [`DeadlockPolicy::SelfLoop`].
    pub deadlock_states: Vec<StateId>,
    /// Variable valuations, if requested.
    pub state_valuations: Option<StateValuations>,
}

impl ModelComponents {
    pub fn state_count(&self) -> usize {
        self.transition_matrix.row_group_count()
    }

    pub fn choice_count(&self) -> usize {
        self.transition_matrix.row_count()
    }
}

/// Lifecycle of a builder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BuildPhase {
    Idle,
    Exploring,
    Finalizing,
    Done,
    Failed,
}

/// Explores the state space of a generator into [`ModelComponents`].
pub struct ExplicitModelBuilder<G> {
    generator: G,
    options: Options,
    phase: BuildPhase,
    registry: StateStorage,
    remapping: Option<Remapping>,
    state_valuations: Option<StateValuations>,
}

impl<G> ExplicitModelBuilder<G>
where
    G: NextStateGenerator,
{
    pub fn new(generator: G) -> Self {
        Self::with_options(generator, Options::default())
    }

    pub fn with_options(generator: G, options: Options) -> Self {
        Self {
            generator,
            options,
            phase: BuildPhase::Idle,
            registry: StateStorage::default(),
            remapping: None,
            state_valuations: None,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Explores the model in the configured exploration order.
    pub fn build(&mut self) -> Result<ModelComponents, BuildError> {
        let mut frontier = self.options.exploration_order.frontier();
        self.run(&mut *frontier, |exploration, generator, frontier| {
            exploration.explore(generator, frontier)
        })
    }

    /// Explores the model in the order of a custom frontier.
    ///
    /// The configured [`Options::exploration_order`] is ignored.
    pub fn build_with_frontier<F>(&mut self, mut frontier: F) -> Result<ModelComponents, BuildError>
    where
        F: Frontier,
    {
        self.run(&mut frontier, |exploration, generator, frontier| {
            exploration.explore(generator, frontier)
        })
    }

    /// Valuations of the last successful build, if requested.
    pub fn state_valuations(&self) -> Option<&StateValuations> {
        match self.phase {
            BuildPhase::Done => self.state_valuations.as_ref(),
            _ => None,
        }
    }

    /// Final id of a state of the last successful build.
    pub fn state_id(&self, state: &CompressedState) -> Option<StateId> {
        match (self.phase, &self.remapping) {
            (BuildPhase::Done, Some(remapping)) => self.registry.get(state).map(|id| remapping.apply(id)),
            _ => None,
        }
    }

    fn set_phase(&mut self, phase: BuildPhase) {
        debug!("phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn run<E>(&mut self, frontier: &mut dyn Frontier, explore: E) -> Result<ModelComponents, BuildError>
    where
        E: FnOnce(&mut Exploration<'_>, &G, &mut dyn Frontier) -> Result<(), BuildError>,
    {
        self.registry.clear();
        self.remapping = None;
        self.state_valuations = None;

        let result = self.run_phases(frontier, explore);
        match &result {
            Ok(_) => self.set_phase(BuildPhase::Done),
            Err(e) => {
                debug!("build failed: {}", e);
                self.set_phase(BuildPhase::Failed);
            }
        }
        result
    }

    fn run_phases<E>(&mut self, frontier: &mut dyn Frontier, explore: E) -> Result<ModelComponents, BuildError>
    where
        E: FnOnce(&mut Exploration<'_>, &G, &mut dyn Frontier) -> Result<(), BuildError>,
    {
        let start = Instant::now();
        let options = self.options.clone();
        options.validate()?;

        let model_type = self.generator.model_type();
        let reward_builders = select_reward_models(&self.generator.reward_models(), &options.reward_models)?;
        let label_names = self.generator.label_names();
        check_label_names(&label_names)?;
        info!(
            "Building {} ({} reward model(s), remap = {})",
            model_type,
            reward_builders.len(),
            frontier.requires_remap()
        );

        self.set_phase(BuildPhase::Exploring);
        let registry = std::mem::take(&mut self.registry);
        let mut exploration = Exploration::new(
            &options,
            model_type,
            label_names,
            reward_builders,
            registry,
        );
        exploration.seed(&self.generator, frontier)?;
        explore(&mut exploration, &self.generator, frontier)?;

        self.set_phase(BuildPhase::Finalizing);
        let (components, registry, remapping) = exploration.finish(&self.generator, frontier.requires_remap())?;

        info!(
            "Explored {} states, {} choices, {} transitions in {:.3?}",
            components.state_count(),
            components.choice_count(),
            components.transition_matrix.entry_count(),
            start.elapsed()
        );

        self.registry = registry;
        self.remapping = Some(remapping);
        self.state_valuations = components.state_valuations.clone();
        Ok(components)
    }
}

impl<G> ExplicitModelBuilder<G>
where
    G: NextStateGenerator + Sync,
{
    /// Explores the model expanding up to `workers` states concurrently.
    ///
    /// Registration and row appending stay on the calling thread, in pop
    /// order, so the result only depends on the order and the worker count.
    /// Under breadth-first order it is identical to [`build`][Self::build].
    pub fn build_parallel(&mut self, workers: NonZeroUsize) -> Result<ModelComponents, BuildError> {
        let mut frontier = self.options.exploration_order.frontier();
        self.run(&mut *frontier, |exploration, generator, frontier| {
            exploration.explore_parallel(generator, frontier, workers)
        })
    }
}

fn check_label_names(names: &[String]) -> Result<(), ConfigurationError> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(ConfigurationError::DuplicateLabel { name: name.clone() });
        }
    }
    Ok(())
}

fn select_reward_models(
    declared: &[RewardModelInfo],
    selection: &RewardModelSelection,
) -> Result<Vec<RewardModelBuilder>, ConfigurationError> {
    for (i, info) in declared.iter().enumerate() {
        if declared[..i].iter().any(|other| other.name == info.name) {
            return Err(ConfigurationError::DuplicateRewardModel {
                name: info.name.clone(),
            });
        }
    }

    let builders = match selection {
        RewardModelSelection::None => Vec::new(),
        RewardModelSelection::All => declared
            .iter()
            .enumerate()
            .map(|(i, info)| RewardModelBuilder::new(i, info))
            .collect(),
        RewardModelSelection::Named(names) => {
            let mut builders: Vec<RewardModelBuilder> = Vec::with_capacity(names.len());
            for name in names {
                let index = declared
                    .iter()
                    .position(|info| &info.name == name)
                    .ok_or_else(|| ConfigurationError::UnknownRewardModel { name: name.clone() })?;
                if builders.iter().all(|b| b.index() != index) {
                    builders.push(RewardModelBuilder::new(index, &declared[index]));
                }
            }
            builders
        }
    };
    for builder in &builders {
        debug!("selected reward model '{}'", builder.name());
    }
    Ok(builders)
}

/// Working state of one build, exclusively owned by the orchestrating thread.
struct Exploration<'o> {
    options: &'o Options,
    model_type: ModelType,
    label_names: Vec<String>,
    registry: StateStorage,
    matrix: SparseMatrixBuilder,
    reward_builders: Vec<RewardModelBuilder>,
    /// One bit vector per declared state label, one bit per expanded state.
    label_states: Vec<BitVector>,
    markovian_choices: Option<BitVector>,
    choice_labels: Option<ChoiceLabeling>,
    remapping: Remapping,
    initial_states: Vec<StateId>,
    deadlock_groups: Vec<usize>,
}

impl<'o> Exploration<'o> {
    fn new(
        options: &'o Options,
        model_type: ModelType,
        label_names: Vec<String>,
        reward_builders: Vec<RewardModelBuilder>,
        registry: StateStorage,
    ) -> Self {
        let label_states = vec![BitVector::default(); label_names.len()];
        Self {
            options,
            model_type,
            label_names,
            registry,
            matrix: SparseMatrixBuilder::new(),
            reward_builders,
            label_states,
            markovian_choices: model_type.is_hybrid().then(BitVector::default),
            choice_labels: options.build_choice_labels.then(ChoiceLabeling::new),
            remapping: Remapping::new(),
            initial_states: Vec::new(),
            deadlock_groups: Vec::new(),
        }
    }

    fn expanded(&self) -> usize {
        self.matrix.row_group_count()
    }

    fn check_abort(&self) -> Result<(), BuildError> {
        match &self.options.abort {
            Some(signal) if signal.is_aborted() => Err(BuildError::Aborted {
                explored: self.expanded(),
            }),
            _ => Ok(()),
        }
    }

    fn exhausted(&self, cause: ResourceExhaustion) -> BuildError {
        BuildError::ResourceExhausted {
            explored: self.expanded(),
            cause,
        }
    }

    /// Returns the id of a state, registering and pushing it if unseen.
    fn register(&mut self, state: CompressedState, frontier: &mut dyn Frontier) -> Result<StateId, BuildError> {
        let (id, new) = self.registry.lookup_or_insert(state);
        if new {
            if let Some(limit) = self.options.max_states {
                if self.registry.len() > limit {
                    return Err(self.exhausted(ResourceExhaustion::TooManyStates { limit }));
                }
            }
            trace!("new state {}", id);
            frontier.push(id, self.registry.state(id));
        }
        Ok(id)
    }

    fn seed<G>(&mut self, generator: &G, frontier: &mut dyn Frontier) -> Result<(), BuildError>
    where
        G: NextStateGenerator,
    {
        let states = generator
            .initial_states()
            .map_err(|e| BuildError::generator(None, e))?;
        if states.is_empty() {
            return Err(BuildError::NoInitialStates);
        }
        for state in states {
            let id = self.register(state, frontier)?;
            if !self.initial_states.contains(&id) {
                self.initial_states.push(id);
            }
        }
        debug!("seeded {} initial state(s)", self.initial_states.len());
        Ok(())
    }

    fn explore<G>(&mut self, generator: &G, frontier: &mut dyn Frontier) -> Result<(), BuildError>
    where
        G: NextStateGenerator,
    {
        while let Some(id) = frontier.pop() {
            self.check_abort()?;
            trace!("expand(state = {})", id);
            let behavior = generator
                .expand(self.registry.state(id))
                .map_err(|e| BuildError::generator(Some(id), e))?;
            self.append(id, behavior, frontier)?;
        }
        Ok(())
    }

    fn explore_parallel<G>(
        &mut self,
        generator: &G,
        frontier: &mut dyn Frontier,
        workers: NonZeroUsize,
    ) -> Result<(), BuildError>
    where
        G: NextStateGenerator + Sync,
    {
        let workers = workers.get();
        let batch_size = workers * BATCH_PER_WORKER;
        let mut batch = Vec::with_capacity(batch_size);

        loop {
            self.check_abort()?;
            batch.clear();
            batch.extend(std::iter::from_fn(|| frontier.pop()).take(batch_size));
            if batch.is_empty() {
                return Ok(());
            }
            trace!("expand(batch = {})", batch.len());

            let registry = &self.registry;
            let chunk_size = (batch.len() + workers - 1) / workers;
            let results: Vec<(StateId, Result<StateBehavior, GeneratorError>)> = thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .chunks(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || {
                            chunk
                                .iter()
                                .map(|&id| (id, generator.expand(registry.state(id))))
                                .collect::<Vec<_>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|handle| match handle.join() {
                        Ok(results) => results,
                        Err(payload) => std::panic::resume_unwind(payload),
                    })
                    .collect()
            });

            for (id, behavior) in results {
                let behavior = behavior.map_err(|e| BuildError::generator(Some(id), e))?;
                self.append(id, behavior, frontier)?;
            }
        }
    }

    /// Appends the row group of an expanded state.
    fn append(&mut self, id: StateId, behavior: StateBehavior, frontier: &mut dyn Frontier) -> Result<(), BuildError> {
        let group = self.matrix.row_group_count();
        self.remapping.record(id, group);
        self.matrix.new_row_group();

        for states in self.label_states.iter_mut() {
            states.push(false);
        }
        for &label in &behavior.labels {
            match self.label_states.get_mut(label) {
                Some(states) => states.set(group, true),
                None => return Err(BuildError::generator(Some(id), GeneratorError::UnknownLabel { label })),
            }
        }

        for builder in self.reward_builders.iter_mut() {
            builder.add_state_reward(behavior.state_reward(builder.index()));
        }

        let mut choices = behavior.choices;
        if choices.is_empty() || choices.iter().any(Choice::is_empty) {
            match self.options.deadlock_policy {
                DeadlockPolicy::Fail => return Err(BuildError::generator(Some(id), GeneratorError::Deadlock)),
                DeadlockPolicy::SelfLoop => {
                    trace!("deadlock in state {}, adding self-loop", id);
                    if choices.is_empty() {
                        let mut choice = Choice::new();
                        choice.markovian = self.model_type.is_hybrid();
                        choices.push(choice);
                    }
                    self.deadlock_groups.push(group);
                }
            }
        }

        if self.model_type.is_deterministic() && choices.len() > 1 {
            return Err(ModelingInconsistency::MultipleChoicesInDeterministicModel {
                state: id,
                count: choices.len(),
            }
            .into());
        }

        for (index, choice) in choices.into_iter().enumerate() {
            self.append_choice(id, index, choice, frontier)?;
        }
        Ok(())
    }

    fn append_choice(
        &mut self,
        id: StateId,
        index: usize,
        choice: Choice,
        frontier: &mut dyn Frontier,
    ) -> Result<(), BuildError> {
        for builder in self.reward_builders.iter_mut() {
            builder.add_state_action_reward(choice.reward(builder.index()));
        }
        if let Some(labels) = self.choice_labels.as_mut() {
            labels.push(choice.labels.iter().copied());
        }
        if let Some(markovian) = self.markovian_choices.as_mut() {
            markovian.push(choice.markovian);
        }

        let is_rate = self.model_type.is_rate_choice(choice.markovian);
        let strict = self.options.check_probabilities;
        let mut entries = Vec::with_capacity(choice.successors().len().max(1));
        let mut sum = 0.0;

        if choice.is_empty() {
            entries.push((id.index(), 1.0));
            sum = 1.0;
        }
        for (successor, value) in choice.into_successors() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ModelingInconsistency::InvalidValue {
                    state: id,
                    choice: index,
                    value,
                }
                .into());
            }
            let target = self.register(successor, frontier)?;
            entries.push((target.index(), value));
            sum += value;
        }

        if strict && !is_rate && (sum - 1.0).abs() > self.options.tolerance {
            return Err(ModelingInconsistency::ProbabilitiesNotWellFormed {
                state: id,
                choice: index,
                sum,
            }
            .into());
        }
        if let Some(limit) = self.options.max_entries {
            if self.matrix.entry_count() + entries.len() > limit {
                return Err(self.exhausted(ResourceExhaustion::TooManyEntries { limit }));
            }
        }

        self.matrix.add_row(entries);
        Ok(())
    }

    /// Freezes all accumulators into the final numbering.
    fn finish<G>(
        self,
        generator: &G,
        needs_remap: bool,
    ) -> Result<(ModelComponents, StateStorage, Remapping), BuildError>
    where
        G: NextStateGenerator,
    {
        let Exploration {
            options,
            model_type,
            label_names,
            registry,
            mut matrix,
            reward_builders,
            label_states,
            markovian_choices,
            mut choice_labels,
            remapping,
            initial_states,
            deadlock_groups,
        } = self;

        let state_count = registry.len();
        assert_eq!(matrix.row_group_count(), state_count, "Every discovered state must be expanded");
        assert!(remapping.is_total(), "Remapping must cover every state");

        if needs_remap {
            debug!("remapping {} states to expansion order", state_count);
            matrix.replace_columns(remapping.as_slice());
        } else {
            debug_assert!(remapping.is_identity());
        }
        let matrix = matrix.build(Some(state_count));
        let row_count = matrix.row_count();

        let mut reward_models: BTreeMap<String, RewardModel> = reward_builders
            .into_iter()
            .map(|builder| builder.build(state_count, row_count))
            .collect();

        let mut state_labeling = StateLabeling::new(state_count);
        for (name, states) in label_names.into_iter().zip(label_states) {
            state_labeling.insert(name, states);
        }

        let (transition_matrix, markovian_states) = match markovian_choices {
            Some(markovian_choices) => {
                let normalized = normalize(
                    &matrix,
                    &markovian_choices,
                    &mut reward_models,
                    choice_labels.as_mut(),
                    options.markovian_policy,
                )?;
                (normalized.matrix, Some(normalized.markovian_states))
            }
            None => (matrix, None),
        };

        let mut initial_states: Vec<StateId> = initial_states.into_iter().map(|s| remapping.apply(s)).collect();
        initial_states.sort_unstable();
        let deadlock_states = deadlock_groups.into_iter().map(StateId::new).collect();

        let state_valuations = if options.build_state_valuations {
            let valuations = registry
                .iter()
                .map(|(id, state)| generator.decode(state).map_err(|e| BuildError::generator(Some(id), e)))
                .collect::<Result<Vec<_>, _>>()?;
            let valuations = if needs_remap {
                remapping.permute(valuations)
            } else {
                valuations
            };
            Some(StateValuations::new(valuations))
        } else {
            None
        };

        let components = ModelComponents {
            model_type,
            transition_matrix,
            state_labeling,
            reward_models,
            choice_labeling: choice_labels,
            markovian_states,
            initial_states,
            deadlock_states,
            state_valuations,
        };
        Ok((components, registry, remapping))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::error::ErrorKind;
    use crate::state::Valuation;

    /// A three-state ring 0 -> 1 -> 2 -> 0 with a label on state 2.
    struct Ring;

    impl NextStateGenerator for Ring {
        fn model_type(&self) -> ModelType {
            ModelType::Dtmc
        }
        fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
            Ok(vec![CompressedState::from_u64(0)])
        }
        fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
            let s = state.as_words()[0];
            let next = CompressedState::from_u64((s + 1) % 3);
            let mut behavior = StateBehavior::new().with_choice(Choice::new().with_successor(next, 1.0));
            if s == 2 {
                behavior = behavior.with_label(0);
            }
            Ok(behavior)
        }
        fn decode(&self, _state: &CompressedState) -> Result<Valuation, GeneratorError> {
            Ok(Valuation::new())
        }
        fn label_names(&self) -> Vec<String> {
            vec!["last".to_string()]
        }
    }

    #[test]
    fn test_phases() {
        let mut builder = ExplicitModelBuilder::new(Ring);
        assert_eq!(builder.phase(), BuildPhase::Idle);
        let model = builder.build().unwrap();
        assert_eq!(builder.phase(), BuildPhase::Done);
        assert_eq!(model.state_count(), 3);
        assert!(model.state_labeling.has_label("last", 2));
        assert_eq!(builder.state_id(&CompressedState::from_u64(1)), Some(StateId::new(1)));
        assert_eq!(builder.state_id(&CompressedState::from_u64(7)), None);
    }

    #[test]
    fn test_failed_phase() {
        let options = Options::default().with_max_states(2);
        let mut builder = ExplicitModelBuilder::with_options(Ring, options);
        let err = builder.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
        assert_eq!(builder.phase(), BuildPhase::Failed);
        assert_eq!(builder.state_id(&CompressedState::from_u64(0)), None);
    }

    #[test]
    fn test_invalid_tolerance() {
        let options = Options::default().with_tolerance(-1.0);
        let err = ExplicitModelBuilder::with_options(Ring, options).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::Configuration(ConfigurationError::InvalidTolerance { tolerance: -1.0 })
        );
    }

    #[test]
    fn test_abort_signal() {
        let signal = AbortSignal::new();
        signal.abort();
        let options = Options::default().with_abort_signal(signal.clone());
        let err = ExplicitModelBuilder::with_options(Ring, options).build().unwrap_err();
        assert_eq!(err, BuildError::Aborted { explored: 0 });

        signal.reset();
        assert!(!signal.is_aborted());
    }

    #[test]
    fn test_select_reward_models() {
        let declared = vec![
            RewardModelInfo::new("", true, false),
            RewardModelInfo::new("cost", false, true),
        ];
        let all = select_reward_models(&declared, &RewardModelSelection::All).unwrap();
        assert_eq!(all.len(), 2);

        let none = select_reward_models(&declared, &RewardModelSelection::None).unwrap();
        assert!(none.is_empty());

        let named = select_reward_models(
            &declared,
            &RewardModelSelection::Named(vec!["cost".into(), "cost".into()]),
        )
        .unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].index(), 1);

        let err = select_reward_models(&declared, &RewardModelSelection::Named(vec!["time".into()])).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownRewardModel { name: "time".into() });
    }

    #[test]
    fn test_duplicate_reward_model() {
        let declared = vec![RewardModelInfo::new("r", true, false), RewardModelInfo::new("r", false, true)];
        let err = select_reward_models(&declared, &RewardModelSelection::All).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateRewardModel { name: "r".into() });
    }

    #[test]
    fn test_duplicate_label() {
        assert!(check_label_names(&["a".into(), "b".into()]).is_ok());
        let err = check_label_names(&["a".into(), "b".into(), "a".into()]).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateLabel { name: "a".into() });
    }
}
