//! Knuth-Yao die: simulating a fair six-sided die with a fair coin.
//!
//! Run with:
//! ```bash
//! cargo run --example dice -- --order dfs --valuations
//! ```

use std::num::NonZeroUsize;

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
    /// Exploration order (`bfs` or `dfs`).
    #[clap(long, value_name = "ORDER", default_value = "bfs")]
    order: ExplorationOrder,

    /// Number of expansion threads.
    #[clap(long, value_name = "INT")]
    workers: Option<NonZeroUsize>,

    /// Build and print state valuations.
    #[clap(long)]
    valuations: bool,
}

struct Die {
    vars: VariableInformation,
}

impl Die {
    fn new() -> Self {
        let mut vars = VariableInformation::new();
        vars.add_int("s", 0, 7).add_int("d", 0, 6);
        Self { vars }
    }

    fn state(&self, s: i64, d: i64) -> Result<CompressedState, GeneratorError> {
        self.vars.encode([("s", Value::Int(s)), ("d", Value::Int(d))])
    }

    fn int(&self, state: &CompressedState, name: &str) -> Result<i64, GeneratorError> {
        match self.vars.get(state, name)? {
            Value::Int(v) => Ok(v),
            Value::Bool(_) => Err(GeneratorError::Unsupported(format!("boolean '{}'", name))),
        }
    }
}

impl NextStateGenerator for Die {
    fn model_type(&self) -> ModelType {
        ModelType::Dtmc
    }

    fn initial_states(&self) -> Result<Vec<CompressedState>, GeneratorError> {
        Ok(vec![self.state(0, 0)?])
    }

    fn expand(&self, state: &CompressedState) -> Result<StateBehavior, GeneratorError> {
        let s = self.int(state, "s")?;
        let d = self.int(state, "d")?;

        let (heads, tails) = match s {
            0 => (self.state(1, 0)?, self.state(2, 0)?),
            1 => (self.state(3, 0)?, self.state(4, 0)?),
            2 => (self.state(5, 0)?, self.state(6, 0)?),
            3 => (self.state(1, 0)?, self.state(7, 1)?),
            4 => (self.state(7, 2)?, self.state(7, 3)?),
            5 => (self.state(7, 4)?, self.state(7, 5)?),
            6 => (self.state(2, 0)?, self.state(7, 6)?),
            _ => {
                let done = Choice::new().with_successor(state.clone(), 1.0);
                let mut behavior = StateBehavior::new().with_choice(done).with_label(0);
                if d == 6 {
                    behavior = behavior.with_label(1);
                }
                return Ok(behavior);
            }
        };

        let flip = Choice::new()
            .with_successor(heads, 0.5)
            .with_successor(tails, 0.5)
            .with_rewards([1.0]);
        Ok(StateBehavior::new().with_choice(flip))
    }

    fn decode(&self, state: &CompressedState) -> Result<Valuation, GeneratorError> {
        Ok(self.vars.decode(state))
    }

    fn label_names(&self) -> Vec<String> {
        vec!["done".to_string(), "six".to_string()]
    }

    fn reward_models(&self) -> Vec<RewardModelInfo> {
        vec![RewardModelInfo::new("coin_flips", false, true)]
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let options = Options::default()
        .with_exploration_order(args.order)
        .with_state_valuations(args.valuations);
    let mut builder = ExplicitModelBuilder::with_options(Die::new(), options);
    let model = match args.workers {
        Some(workers) => builder.build_parallel(workers)?,
        None => builder.build()?,
    };

    println!("{} with {} states:", model.model_type, model.state_count());
    println!("{}", model.transition_matrix);
    print!("{}", model.state_labeling);
    println!("initial states: {:?}", model.initial_states);

    if let Some(valuations) = &model.state_valuations {
        for (id, valuation) in valuations.iter() {
            println!("{:>4}: {}", id, valuation);
        }
    }

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
