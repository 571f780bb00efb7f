use std::{
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use inference_dispatch::{
    config::{Annotations, DispatchPolicy, DEFAULT_ANNOTATIONS_PATH},
    core::{Endpoint, EndpointType, PredictiveUnitState, UnitRole, Verb},
    logging::{self, LoggingConfig},
    protocols::{Feedback, SeldonMessage},
    Dispatcher,
};
use tracing::{error, Level};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Transport {
    #[value(name = "rest")]
    Rest,
    #[value(name = "grpc")]
    Grpc,
}

impl From<Transport> for EndpointType {
    fn from(transport: Transport) -> Self {
        match transport {
            Transport::Rest => EndpointType::Rest,
            Transport::Grpc => EndpointType::Grpc,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "inference-dispatch")]
#[command(about = "Send one verb to one inference graph node and print its reply")]
struct CliArgs {
    /// route, send-feedback, transform-input, transform-output or aggregate
    #[arg(value_parser = parse_verb)]
    verb: Verb,

    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(long, default_value_t = 9000)]
    port: u16,

    #[arg(long, value_enum, default_value_t = Transport::Rest)]
    transport: Transport,

    /// MODEL, ROUTER, TRANSFORMER, OUTPUT_TRANSFORMER, COMBINER or UNKNOWN
    #[arg(long, default_value = "unknown", value_parser = parse_role)]
    role: UnitRole,

    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    image: String,

    #[arg(long, default_value = "")]
    version: String,

    /// Downward-API annotations file holding timeout and size overrides
    #[arg(long, default_value = DEFAULT_ANNOTATIONS_PATH)]
    annotations: PathBuf,

    /// JSON payload file; reads stdin when omitted
    #[arg(long)]
    payload: Option<PathBuf>,

    #[arg(long, default_value = "warn", value_parser = ["debug", "info", "warn", "error"])]
    log_level: String,

    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn parse_verb(s: &str) -> Result<Verb, String> {
    s.parse()
}

fn parse_role(s: &str) -> Result<UnitRole, String> {
    s.parse()
}

impl CliArgs {
    fn to_logging_config(&self) -> LoggingConfig {
        let level = match self.log_level.as_str() {
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        };
        LoggingConfig {
            level,
            json_format: self.log_json,
            colorize: !self.log_json,
            ..Default::default()
        }
    }

    fn to_unit_state(&self) -> PredictiveUnitState {
        let endpoint = Endpoint::new(self.host.clone(), self.port, self.transport.into());
        PredictiveUnitState::new(self.name.clone(), self.role, endpoint)
            .with_image(self.image.clone(), self.version.clone())
    }

    fn read_payload(&self) -> anyhow::Result<String> {
        match &self.payload {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read payload from {}", path.display())),
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read payload from stdin")?;
                Ok(buf)
            }
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<SeldonMessage> {
    let annotations = Annotations::from_file(&args.annotations)?;
    let policy = DispatchPolicy::from_annotations(&annotations);
    let dispatcher = Dispatcher::new(&policy)?;

    let state = args.to_unit_state();
    let raw = args.read_payload()?;

    let reply = match args.verb {
        Verb::Route => {
            let msg: SeldonMessage = serde_json::from_str(&raw).context("Invalid message")?;
            dispatcher.route(&msg, &state).await?
        }
        Verb::TransformInput => {
            let msg: SeldonMessage = serde_json::from_str(&raw).context("Invalid message")?;
            dispatcher.transform_input(&msg, &state).await?
        }
        Verb::TransformOutput => {
            let msg: SeldonMessage = serde_json::from_str(&raw).context("Invalid message")?;
            dispatcher.transform_output(&msg, &state).await?
        }
        Verb::SendFeedback => {
            let feedback: Feedback = serde_json::from_str(&raw).context("Invalid feedback")?;
            dispatcher.send_feedback(&feedback, &state).await?
        }
        Verb::Aggregate => {
            let outputs: Vec<SeldonMessage> =
                serde_json::from_str(&raw).context("Aggregate expects a JSON array of messages")?;
            dispatcher.aggregate(&outputs, &state).await?
        }
    };

    Ok(reply)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let _log_guard = logging::init_logging(args.to_logging_config());

    match run(args).await {
        Ok(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(())
        }
        Err(e) => {
            error!("Dispatch failed: {:#}", e);
            Err(e)
        }
    }
}
