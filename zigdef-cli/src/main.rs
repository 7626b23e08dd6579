use anyhow::Context as _;
use clap::{Parser, Subcommand};
use heck::ToSnakeCase as _;
use zigdef::{
    Configured, DeviceError, LoadedDefinition, Registry,
    common::Cluster,
    converters::Message,
    devices::air_quality_monitor,
    sim::{Phase, SimDevice, SimEndpoint},
};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Use the air quality monitor definition without CO2 support
    #[arg(long)]
    without_co2: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List loaded definitions
    List,
    /// Print the exposes of a definition as JSON
    Exposes { model_id: String },
    /// Decode a raw ZCL attribute payload into sensor payloads
    Decode {
        model_id: String,
        /// Cluster name or id, e.g. msCO2 or 0x040d
        #[arg(long)]
        cluster: Cluster,
        /// Payload is a read attributes response instead of a report
        #[arg(long)]
        read: bool,
        /// Link quality the frame was received with
        #[arg(long)]
        linkquality: Option<u8>,
        /// Payload bytes in hex
        payload: String,
    },
    /// Dry-run a configure routine against a simulated device
    Configure {
        model_id: String,
        /// Make binding this cluster time out
        #[arg(long)]
        fail_bind: Option<Cluster>,
        /// Make configuring reporting for this cluster time out
        #[arg(long)]
        fail_reporting: Option<Cluster>,
    },
}

fn find<'a>(registry: &'a Registry, model_id: &str) -> anyhow::Result<&'a LoadedDefinition> {
    registry
        .find(model_id)
        .with_context(|| format!("no definition matches model '{model_id}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zigdef::log::init();

    let args = Args::parse();

    let mut registry = Registry::with_builtin()?;
    if args.without_co2 {
        registry.replace(air_quality_monitor::definition_without_co2())?;
    }

    tracing::debug!("{} definitions loaded", registry.len());

    match args.command {
        Command::List => {
            for loaded in registry.iter() {
                let def = loaded.definition();
                let ids = def.zigbee_model.iter().map(|m| m.as_str()).collect::<Vec<_>>();

                println!("{} ({})", def.model, def.vendor);
                println!("  identifiers: {}", ids.join(", "));
                println!("  entity:      {}", def.model.to_snake_case());
                println!("  configure:   {}", if def.configure.is_some() { "yes" } else { "no" });
                println!("  {}", def.description);
            }
        }
        Command::Exposes { model_id } => {
            let loaded = find(&registry, &model_id)?;
            println!("{}", serde_json::to_string_pretty(&loaded.definition().exposes)?);
        }
        Command::Decode { model_id, cluster, read, linkquality, payload } => {
            let loaded = find(&registry, &model_id)?;

            let hex = payload.trim_start_matches("0x").replace([' ', ':'], "");
            let data = hex::decode(&hex).context("payload is not valid hex")?;

            let mut msg = match read {
                false => Message::report(cluster, data),
                true => Message::read_response(cluster, data),
            };
            if let Some(linkquality) = linkquality {
                msg = msg.with_linkquality(linkquality);
            }

            let timestamp = chrono::Utc::now().timestamp();

            let mut out = serde_json::Map::new();
            for reading in loaded.decode(&msg) {
                let unit = loaded
                    .definition()
                    .expose(&reading.property)
                    .and_then(|e| e.unit.clone())
                    .unwrap_or_default();

                out.insert(
                    reading.property.to_string(),
                    serde_json::to_value(reading.into_payload(unit, timestamp))?,
                );
            }

            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Configure { model_id, fail_bind, fail_reporting } => {
            let device = SimDevice::new("0x00124b0000000001", Some(model_id.as_str()));
            let coordinator = SimEndpoint::new(1);

            if let Some(cluster) = fail_bind {
                device.fail(Phase::Bind, cluster, DeviceError::Timeout).await;
            }
            if let Some(cluster) = fail_reporting {
                device
                    .fail(Phase::ConfigureReporting, cluster, DeviceError::Timeout)
                    .await;
            }

            let result = registry.configure(&device, &coordinator).await;

            for request in device.requests().await {
                println!("{}", serde_json::to_string(&request)?);
            }

            match result? {
                Configured::Done => tracing::info!("Configuration complete"),
                Configured::Skipped => tracing::info!("Definition has no configure routine"),
            }
        }
    }

    Ok(())
}
