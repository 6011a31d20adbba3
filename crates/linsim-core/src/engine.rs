//! Hand-off between a parsed netlist and a time-domain simulator.
//!
//! Simulation itself lives outside this crate. [`SimulationInput`] carries
//! what a simulator needs: a flat netlist, the initial conditions pulled from
//! its `.ic` directives, and the step limits. Implementors of [`Engine`]
//! build their own state from it and advance time on every [`Engine::run`].

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::netlist::Netlist;

/// Timestep limits for a transient run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    /// Nominal timestep (s).
    pub timestep: f64,
    /// Largest step the engine may take (s).
    pub max_timestep: f64,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            timestep: 0.1,
            max_timestep: 0.1,
        }
    }
}

impl StepConfig {
    /// Step configuration with the nominal step also used as the maximum.
    pub fn new(timestep: f64) -> Self {
        Self {
            timestep,
            max_timestep: timestep,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("timestep", self.timestep), ("max_timestep", self.max_timestep)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Configuration(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.timestep > self.max_timestep {
            return Err(Error::Configuration(format!(
                "timestep {} exceeds max_timestep {}",
                self.timestep, self.max_timestep
            )));
        }
        Ok(())
    }
}

/// Everything a simulator needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInput {
    /// Flattened copy of the source netlist.
    pub netlist: Netlist,
    /// Quantity to starting value, e.g. `v(n1) -> "10"`.
    pub initial_conditions: IndexMap<String, String>,
    pub steps: StepConfig,
}

impl SimulationInput {
    /// Flatten a copy of `netlist` and collect its initial conditions.
    ///
    /// The source netlist is left untouched.
    pub fn prepare(netlist: &Netlist, steps: StepConfig) -> Result<Self> {
        steps.validate()?;

        let mut flat = netlist.clone();
        flat.flatten()?;
        let initial_conditions = flat.initial_conditions();

        log::debug!(
            "prepared '{}' for simulation: {} elements, {} initial conditions, dt={}",
            flat.name(),
            flat.block().num_elements(),
            initial_conditions.len(),
            steps.timestep
        );

        Ok(Self {
            netlist: flat,
            initial_conditions,
            steps,
        })
    }

    /// Netlist text for the simulator, without `.ic` lines.
    pub fn definition(&self) -> String {
        self.netlist.definition()
    }
}

/// A stateful time-domain simulator.
pub trait Engine {
    /// Advance simulated time by `duration` seconds from where the previous
    /// call stopped, returning the final value of each observed quantity.
    fn run(&mut self, duration: f64) -> Result<IndexMap<String, f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::directive::Directive;
    use crate::element::Element;

    fn rc_netlist() -> Netlist {
        let mut netlist = Netlist::new("rc");
        let mut stage = Block::new("stage", ["in", "out"]);
        stage.add(Element::parse("r1 in out 1k").unwrap()).unwrap();
        stage.add(Element::parse("c1 out 0 1u").unwrap()).unwrap();

        let root = netlist.block_mut();
        root.add_block(stage).unwrap();
        root.add(Element::parse_instance("x1 n1 n2 stage").unwrap()).unwrap();
        root.add(Element::parse("c1 n1 0 1e-6").unwrap()).unwrap();
        netlist
            .add_directive(Directive::parse(".ic V(n1)=10").unwrap())
            .unwrap();
        netlist
            .add_directive(Directive::parse(".end").unwrap())
            .unwrap();
        netlist
    }

    /// Exponential decay of every initial condition with a fixed time constant.
    struct Decay {
        tau: f64,
        dt: f64,
        state: IndexMap<String, f64>,
    }

    impl Decay {
        fn new(input: &SimulationInput, tau: f64) -> Result<Self> {
            let state = input
                .initial_conditions
                .iter()
                .map(|(quantity, value)| {
                    value
                        .parse::<f64>()
                        .map(|v| (quantity.clone(), v))
                        .map_err(|e| Error::Parse(format!("{quantity}={value}: {e}")))
                })
                .collect::<Result<_>>()?;
            Ok(Self {
                tau,
                dt: input.steps.timestep,
                state,
            })
        }
    }

    impl Engine for Decay {
        fn run(&mut self, duration: f64) -> Result<IndexMap<String, f64>> {
            let steps = (duration / self.dt).round() as usize;
            for value in self.state.values_mut() {
                for _ in 0..steps {
                    *value -= *value * self.dt / self.tau;
                }
            }
            Ok(self.state.clone())
        }
    }

    #[test]
    fn test_step_config_default() {
        let steps = StepConfig::default();
        assert_eq!(steps.timestep, 0.1);
        assert_eq!(steps.max_timestep, 0.1);
        assert!(steps.validate().is_ok());
    }

    #[test]
    fn test_step_config_validation() {
        assert!(StepConfig::new(1e-4).validate().is_ok());
        for bad in [
            StepConfig::new(0.0),
            StepConfig::new(-1.0),
            StepConfig::new(f64::NAN),
            StepConfig {
                timestep: 0.2,
                max_timestep: 0.1,
            },
        ] {
            assert!(matches!(bad.validate(), Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn test_prepare_flattens_copy() {
        let netlist = rc_netlist();
        let input = SimulationInput::prepare(&netlist, StepConfig::new(1e-4)).unwrap();

        assert!(input.netlist.block().blocks().is_empty());
        assert!(input.netlist.block().element("x1_1_r1").is_some());
        assert!(netlist.block().element("x1").is_some());
        assert_eq!(
            input.initial_conditions.get("v(n1)").map(String::as_str),
            Some("10")
        );
        assert!(!input.definition().contains(".ic"));
    }

    #[test]
    fn test_prepare_rejects_bad_steps() {
        let netlist = rc_netlist();
        assert!(SimulationInput::prepare(&netlist, StepConfig::new(0.0)).is_err());
    }

    #[test]
    fn test_engine_state_persists() {
        let input = SimulationInput::prepare(&rc_netlist(), StepConfig::new(1e-4)).unwrap();
        let mut engine = Decay::new(&input, 1e-3).unwrap();

        let first = engine.run(1e-3).unwrap();
        let second = engine.run(1e-3).unwrap();
        assert!(first.contains_key("v(n1)"));
        assert!(first["v(n1)"] > second["v(n1)"]);
    }
}
