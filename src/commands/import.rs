use super::{Session, failure};
use crate::Context;
use crate::ui;
use anyhow::{Result, bail};
use declarative::Address;

/// Track an existing remote object under `address`
pub fn run(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let mut session = Session::open(ctx)?;

    if session.state.records.contains_key(&address) {
        bail!("{address} is already tracked; forget it with `state rm {address}` first");
    }

    let resource = session
        .registry
        .require(&address.type_name)
        .map_err(|diags| failure(diags.for_address(&address.to_string())))?;
    let record = resource
        .import(id)
        .map_err(|diags| failure(diags.for_address(&address.to_string())))?;

    log::debug!("Imported {address} from id '{id}'");
    session.state.records.insert(address.clone(), record);
    session.save(ctx)?;

    if !ctx.quiet {
        ui::success(&format!("Imported {address}"));
    }
    Ok(())
}
