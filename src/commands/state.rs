//! state list|show|rm - local inspection, no server calls

use crate::Context;
use crate::cli::StateCommand;
use crate::engine::differ::redact;
use crate::provider;
use crate::state::TrackedState;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::Address;

pub fn run(ctx: &Context, cmd: StateCommand) -> Result<()> {
    let mut state = TrackedState::load(&ctx.state)?;
    match cmd {
        StateCommand::List { target } => {
            list(&state, target.as_deref());
            Ok(())
        }
        StateCommand::Show { address } => show(&state, &address),
        StateCommand::Rm { addresses } => {
            let addresses = addresses
                .iter()
                .map(|a| a.parse())
                .collect::<Result<Vec<Address>, _>>()?;
            let removed = remove(&mut state, &addresses)?;
            state.touch(&ctx.state)?;
            if !ctx.quiet {
                ui::success(&format!("Removed {} from state", ui::count(removed, "record")));
            }
            Ok(())
        }
    }
}

fn list(state: &TrackedState, target: Option<&str>) {
    for address in state.addresses(target) {
        println!("{address}");
    }
}

fn show(state: &TrackedState, address: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let Some(record) = state.records.get(&address) else {
        bail!("{address} is not tracked");
    };

    let registry = provider::offline_registry();
    let shown = match registry.resource(&address.type_name) {
        Some(resource) => redact(record, &resource.schema()),
        None => record.clone(),
    };

    ui::header(&address.to_string());
    let json = serde_json::to_string_pretty(&shown).context("Failed to render record")?;
    println!("{json}");
    Ok(())
}

/// Forget every address, failing before any change if one is untracked
fn remove(state: &mut TrackedState, addresses: &[Address]) -> Result<usize> {
    let missing: Vec<String> = addresses
        .iter()
        .filter(|a| !state.records.contains_key(*a))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        bail!("Not tracked: {}", missing.join(", "));
    }

    for address in addresses {
        state.forget(address);
        log::info!("Forgot {address}");
    }
    Ok(addresses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> TrackedState {
        let mut state = TrackedState::default();
        state.records.insert(
            Address::new("unleash_environment", "staging"),
            json!({"name": "staging", "type": "test"}),
        );
        state.records.insert(
            Address::new("unleash_environment", "qa"),
            json!({"name": "qa", "type": "test"}),
        );
        state
    }

    #[test]
    fn test_remove_is_all_or_nothing() {
        let mut state = state();
        let addresses = vec![
            Address::new("unleash_environment", "qa"),
            Address::new("unleash_environment", "prod"),
        ];
        let err = remove(&mut state, &addresses).unwrap_err();
        assert_eq!(err.to_string(), "Not tracked: unleash_environment.prod");
        assert_eq!(state.records.len(), 2);

        assert_eq!(remove(&mut state, &addresses[..1]).unwrap(), 1);
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_show_untracked() {
        let err = show(&state(), "unleash_environment.prod").unwrap_err();
        assert_eq!(err.to_string(), "unleash_environment.prod is not tracked");
    }
}
