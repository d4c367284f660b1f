//! doord — the Doorward access-point daemon.
//!
//! Wires one door's guards, authorizer, and consequences together and runs
//! them until the first fatal error. Hardware drivers are not wired yet;
//! the strike and light run on mock pins and the tag reader is an idle mock
//! until a `doorward-gpio` hardware feature lands, so today the PIN guard on
//! stdin is the live input path.

use anyhow::Context;
use clap::Parser;
use doorward_admit::{AccessLog, AnyAdmitter, FatalHook, Light, Mux, Strike};
use doorward_auth::{
    Authorizer, Database, DatabaseConfig, DbAuthorizer, Decision, PinChecker, StaticAuth,
};
use doorward_core::{AttemptContext, Credential, DoorId, DoorSide, Result};
use doorward_gpio::{AnyPin, MockPin, PinOutput, Polarity};
use doorward_guard::{Guard, GuardMux, MockReader, PinGuard, TagGuard, TracingLog};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// doord is an NFC and PIN door controller.
#[derive(Debug, Parser)]
#[command(name = "doord", version)]
struct Args {
    /// Numeric door ID, eg: 1
    #[arg(long)]
    door: i32,

    /// Door side, 'A' or 'B'
    #[arg(long)]
    side: String,

    /// Path to the SQLite membership database
    #[arg(long, conflicts_with = "allow")]
    db: Option<String>,

    /// Credential admitted without a database; repeatable
    #[arg(long)]
    allow: Vec<String>,

    /// Number of seconds to open the door for
    #[arg(long, default_value_t = 5)]
    opentime: u64,

    /// Invert the strike/latch logic level (active low unlocks)
    #[arg(long)]
    activelow: bool,

    /// Log filter, eg: 'info' or 'doorward_guard=debug'
    #[arg(long, default_value = "info")]
    loglevel: String,
}

/// The authorizer selected by the flags.
#[derive(Clone)]
enum AnyAuth {
    Db(DbAuthorizer),
    Static(StaticAuth),
}

impl Authorizer for AnyAuth {
    async fn allowed(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        id: &Credential,
    ) -> Result<Decision> {
        match self {
            Self::Db(auth) => auth.allowed(ctx, door, side, id).await,
            Self::Static(auth) => auth.allowed(ctx, door, side, id).await,
        }
    }
}

impl PinChecker for AnyAuth {
    async fn check_pin(
        &self,
        ctx: &AttemptContext,
        door: DoorId,
        side: DoorSide,
        pin: &Credential,
    ) -> Result<String> {
        match self {
            Self::Db(auth) => auth.check_pin(ctx, door, side, pin).await,
            Self::Static(auth) => auth.check_pin(ctx, door, side, pin).await,
        }
    }
}

/// Fatal hook that takes the whole daemon down: a door that may be stuck
/// unlocked needs supervision, not a log line.
struct ExitOnFatal;

impl FatalHook for ExitOnFatal {
    fn fatal(&self, ctx: &AttemptContext, message: &str) {
        error!(
            door = %ctx.door(),
            side = %ctx.side(),
            guard = %ctx.guard_kind(),
            credential = %ctx.credential(),
            "{}",
            message
        );
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.loglevel).context("invalid log level")?)
        .init();

    let door = DoorId::new(args.door).context("invalid door ID")?;
    let side: DoorSide = args.side.parse().context("invalid door side")?;
    let polarity = if args.activelow {
        Polarity::ActiveLow
    } else {
        Polarity::ActiveHigh
    };

    info!("Starting doord");

    let auth = match &args.db {
        Some(path) => {
            let db = Database::new(DatabaseConfig::new(path))
                .await
                .context("failed to open membership database")?;
            AnyAuth::Db(DbAuthorizer::new(db.pool().clone()))
        }
        None => {
            let allow = args
                .allow
                .iter()
                .map(|cred| Credential::new(cred.clone()))
                .collect::<Result<Vec<_>>>()
                .context("invalid --allow credential")?;
            if allow.is_empty() {
                info!("No database and no --allow credentials; every tag will be denied");
            }
            AnyAuth::Static(StaticAuth::new(allow))
        }
    };

    // Mock pins until a hardware feature is wired in.
    let (strike_pin, _strike_handle) = MockPin::new();
    let (light_pin, _light_handle) = MockPin::new();
    let strike_pin = AnyPin::Mock(strike_pin);

    // Make sure the door starts locked before any guard runs.
    strike_pin
        .set_level(polarity.level(false))
        .await
        .context("failed to pre-lock door")?;

    let strike = Strike::new(strike_pin)
        .with_open_for(Duration::from_secs(args.opentime))
        .with_polarity(polarity)
        .with_fatal_hook(Arc::new(ExitOnFatal));

    let gate = Mux::from(vec![
        AnyAdmitter::Strike(strike),
        AnyAdmitter::Light(Light::new(AnyPin::Mock(light_pin))),
        AnyAdmitter::Log(AccessLog::new()),
    ]);

    let tag_guard = TagGuard::new(door, side, MockReader::idle(), auth.clone(), gate);

    let pin_guard = PinGuard::new(
        tokio::io::BufReader::new(tokio::io::stdin()),
        auth,
        door,
        side,
    )
    .with_logger(Arc::new(TracingLog));

    let mut guards = GuardMux::new();
    guards.add(tag_guard);
    guards.add(pin_guard);

    info!("Ready");

    match guards.guard().await {
        Ok(()) => error!("A guard stopped; shutting down"),
        Err(err) => error!("Fatal guard error: {err}"),
    }
    std::process::exit(1);
}
