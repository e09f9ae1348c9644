//! Command execution.
//!
//! Connects to the agent named in a [`Config`], runs the command and prints
//! what comes back. Bindings are printed as they arrive, so a walk that fails
//! part way leaves its earlier output in place.

use crate::agent::{AgentSpec, Connection, DEFAULT_PORT, DEFAULT_TRAP_PORT};
use crate::cli::output::{Printer, format_traversal_time};
use crate::config::{CommandKind, Config, Target};
use crate::error::{Error, Result, UsageErrorKind};
use crate::mib;
use crate::session::Session;
use crate::transport::Transport;
use crate::trap::{self, Uptime};
use futures_core::Stream;
use std::future::poll_fn;
use std::io::{self, Write};
use std::pin::Pin;
use tokio::time::Instant;

fn output_error(source: io::Error) -> Error {
    Error::Io {
        target: None,
        source,
    }
}

/// Run one command. Bindings go to `out`, the traversal time to `diag`.
pub async fn run<W: Write, E: Write>(config: &Config, out: W, mut diag: E) -> Result<()> {
    let mut printer = Printer::new(out, config.output.clone());

    let Some(agent) = config.agent.as_deref() else {
        for oid in mib::entries() {
            printer.oid(&oid).map_err(output_error)?;
        }
        return printer.flush().map_err(output_error);
    };

    let default_port = match config.command {
        CommandKind::Trap => DEFAULT_TRAP_PORT,
        _ => DEFAULT_PORT,
    };
    let spec = AgentSpec::parse(agent, default_port)?;
    let connection = spec.connect(config.session.timeout).await?;

    let result = match connection {
        Connection::Udp(transport) => {
            let session = Session::new(transport, config.session.clone());
            run_session(config, &session, &mut printer, &mut diag).await
        }
        Connection::Tcp(transport) => {
            let session = Session::new(transport, config.session.clone());
            run_session(config, &session, &mut printer, &mut diag).await
        }
    };
    printer.flush().map_err(output_error)?;
    result
}

/// Run one command over an open session.
pub async fn run_session<T, W, E>(
    config: &Config,
    session: &Session<T>,
    printer: &mut Printer<W>,
    diag: &mut E,
) -> Result<()>
where
    T: Transport + 'static,
    W: Write,
    E: Write,
{
    match (&config.target, config.command) {
        (Target::Objects(oids), CommandKind::Get) => {
            let varbinds = session.get(oids).await?.check()?;
            printer.bindings(&varbinds).map_err(output_error)
        }
        (Target::Objects(oids), CommandKind::GetNext) => {
            let varbinds = session.get_next(oids).await?.check()?;
            printer.bindings(&varbinds).map_err(output_error)
        }
        (Target::Objects(oids), CommandKind::BulkGet) => {
            let varbinds = session
                .get_bulk(oids, config.bulk.non_repeaters, config.bulk.max_repetitions)
                .await?
                .check()?;
            printer.bindings(&varbinds).map_err(output_error)
        }
        (Target::Subtree(root), CommandKind::Walk | CommandKind::BulkWalk) => {
            walk(config, session, root.clone(), printer, diag).await
        }
        (
            Target::Trap {
                uptime,
                trap_oid,
                bindings,
            },
            CommandKind::Trap,
        ) => {
            let uptime = Uptime::parse(uptime)?;
            let triples = trap::triples(bindings)?;
            let notification = trap::assemble(uptime, trap_oid, &triples)?;
            notification.send(session).await
        }
        _ => Err(Error::usage(UsageErrorKind::Arguments)),
    }
}

async fn walk<T, W, E>(
    config: &Config,
    session: &Session<T>,
    root: crate::Oid,
    printer: &mut Printer<W>,
    diag: &mut E,
) -> Result<()>
where
    T: Transport + 'static,
    W: Write,
    E: Write,
{
    let start = Instant::now();
    let mut walk = session.walk(root, config.walk.clone());

    loop {
        let item = poll_fn(|cx| Pin::new(&mut walk).poll_next(cx)).await;
        match item {
            Some(Ok(vb)) => printer.binding(&vb).map_err(output_error)?,
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }

    let elapsed = start.elapsed();
    if printer.options().summary {
        printer.summary(walk.matches()).map_err(output_error)?;
    }
    if printer.options().time {
        writeln!(diag, "{}", format_traversal_time(elapsed)).map_err(output_error)?;
    }
    Ok(())
}
