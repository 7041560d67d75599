//! A bounded single-server queue as a Markov automaton.
//!
//! Jobs arrive with rate `arrival` and are served with rate `service`.
//! Starting a service is an instantaneous (probabilistic) action, so idle
//! states with waiting jobs carry both kinds of choices.
//!
//! Run with:
//! ```bash
//! cargo run --example queue -- --capacity 5
//! ```

use clap::Parser;

use explicit_rs::builder::{ExplicitModelBuilder, Options};
use explicit_rs::error::GeneratorError;
use explicit_rs::frontier::ExplorationOrder;
use explicit_rs::generator::{Choice, NextStateGenerator, RewardModelInfo, StateBehavior};
use explicit_rs::state::{CompressedState, Valuation, Value, VariableInformation};
use explicit_rs::types::ModelType;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Maximal number of waiting jobs.
    #[clap(long, value_name = "INT", default_value = "3")]
    capacity: i64,

    /// Arrival rate.
    #[clap(long, value_name = "FLOAT", default_value = "1.0")]
    arrival: f64,

    /// Service rate.
    #[clap(long, value_name = "FLOAT", default_value = "2.0")]
    service: f64,

    /// Exploration order (`bfs` or `dfs`).
    #[clap(long, value_name = "ORDER", default_value = "bfs")]
    order: ExplorationOrder,
}

struct Queue {
    vars: VariableInformation,
    capacity: i64,
    arrival: f64,
    service: f64,
}

impl Queue {
    fn new(capacity: i64, arrival: f64, service: f64) -> Self {
        let mut vars = VariableInformation::new();
        vars.add_int("jobs", 0, capacity).add_bool("busy");
        Self {
            vars,
            capacity,
            arrival,
            service,
        }
    }

    fn state(&self, jobs: i64, busy: bool) -> Result<CompressedState, GeneratorError> {
        self.vars.encode([("jobs", Value::Int(jobs)), ("busy", Value::Bool(busy))])
    }
}

impl NextStateGenerator for Queue {
    fn model_type(&self) -> ModelType {
        ModelType::Ma
    }

    fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
        Ok(vec![self.state(0, false)?])
    }

    fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
        let valuation = self.vars.decode(state);
        let (jobs, busy) = match (valuation.get("jobs"), valuation.get("busy")) {
            (Some(Value::Int(jobs)), Some(Value::Bool(busy))) => (jobs, busy),
            _ => return Err(GeneratorError::Unsupported("malformed queue state".into())),
        };

        let mut behavior = StateBehavior::new().with_state_rewards([jobs as f64]);
        if jobs == self.capacity {
            behavior = behavior.with_label(0);
        }
        if jobs > 0 && !busy {
            let start = Choice::new().with_successor(self.state(jobs - 1, true)?, 1.0).with_label(0);
            behavior = behavior.with_choice(start);
        }

        let mut timed = Choice::markovian();
        if jobs < self.capacity {
            timed.add(self.state(jobs + 1, busy)?, self.arrival);
        }
        if busy {
            timed.add(self.state(jobs, false)?, self.service);
        }
        if !timed.is_empty() {
            behavior = behavior.with_choice(timed);
        }
        Ok(behavior)
    }

    fn decode(&self, state: &CompressedState) -> Result<Valuation, GeneratorError> {
        Ok(self.vars.decode(state))
    }

    fn label_names(&self) -> Vec<String> {
        vec!["full".to_string()]
    }

    fn reward_models(&self) -> Vec<RewardModelInfo> {
        vec![RewardModelInfo::new("jobs", true, false)]
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let queue = Queue::new(args.capacity, args.arrival, args.service);
    let options = Options::default()
        .with_exploration_order(args.order)
        .with_choice_labels(true)
        .with_state_valuations(true);
    let model = ExplicitModelBuilder::with_options(queue, options).build()?;

    println!("{}", model.transition_matrix);
    print!("{}", model.state_labeling);

    let markovian = model.markovian_states.unwrap_or_default();
    println!("Markovian states: {}", markovian);
    if let Some(valuations) = &model.state_valuations {
        for (id, valuation) in valuations.iter() {
            let kind = if markovian.get(id.index()) { "markovian" } else { "probabilistic" };
            println!("{:>4}: {} ({})", id, valuation, kind);
        }
    }

    Ok(())
}
