use bytes::Bytes;
use plevm::call_frame::CallFrame;
use plevm::code::Bytecode;
use plevm::db::InMemoryDb;
use plevm::environment::Environment;
use plevm::errors::ExecutionReport;
use plevm::plan::Plan;
use plevm::planner::{Planner, PlannerConfig};
use plevm::tracer::Tracer;
use plevm::vm::VM;
use std::process::ExitCode;
use std::str::FromStr as _;
use tracing::{debug, error, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

/// Logs one line per executed stream element.
struct StepTracer;

impl Tracer for StepTracer {
    fn before_op(&mut self, pc: usize, frame: &CallFrame) {
        debug!(
            pc,
            gas = frame.gas_remaining,
            depth = frame.stack.len(),
            "step"
        );
    }

    fn on_error(&mut self, err: &plevm::errors::VMError) {
        error!(%err, "frame halted");
    }
}

fn main() -> ExitCode {
    let matches = cli::cli().get_matches();

    let log_level = matches
        .get_one::<String>("log.level")
        .expect("log.level has a default");
    let log_filter = EnvFilter::builder()
        .with_default_directive(
            Directive::from_str(log_level).expect("not a supported log level"),
        )
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let code_hex = matches.get_one::<String>("code").expect("code is required");
    let calldata_hex = matches
        .get_one::<String>("calldata")
        .expect("calldata has a default");
    let gas = matches
        .get_one::<String>("gas")
        .expect("gas has a default")
        .parse::<u64>();
    let Ok(gas_limit) = gas else {
        error!("--gas must be an unsigned integer");
        return ExitCode::FAILURE;
    };

    let Ok(raw_code) = decode_hex(code_hex) else {
        error!("bytecode is not valid hex");
        return ExitCode::FAILURE;
    };
    let Ok(calldata) = decode_hex(calldata_hex) else {
        error!("calldata is not valid hex");
        return ExitCode::FAILURE;
    };

    let is_initcode = matches.get_flag("initcode");
    let validated = if is_initcode {
        Bytecode::new_initcode(Bytes::from(raw_code))
    } else {
        Bytecode::new(Bytes::from(raw_code))
    };
    let code = match validated {
        Ok(code) => code,
        Err(err) => {
            error!(%err, "bytecode rejected by the validator");
            return ExitCode::FAILURE;
        }
    };

    let config = PlannerConfig {
        enable_fusion: !matches.get_flag("no-fusion"),
    };
    let plan = match Planner::with_config(&code, config).plan() {
        Ok(plan) => plan,
        Err(err) => {
            error!(%err, "planning failed");
            return ExitCode::FAILURE;
        }
    };
    info!(
        code_bytes = code.len(),
        stream_elements = plan.len(),
        constants = plan.constants().len(),
        fusion = config.enable_fusion,
        "plan ready"
    );

    let mut frame = CallFrame::new(code, gas_limit);
    frame.calldata = Bytes::from(calldata);
    frame.is_initcode = is_initcode;

    let env = Environment::default();
    let db = Box::new(InMemoryDb::new());
    let report = if matches.get_flag("trace") {
        let mut vm = VM::with_tracer(env, db, StepTracer);
        vm.execute(&plan, &mut frame)
    } else {
        let mut vm = VM::new(env, db);
        vm.execute(&plan, &mut frame)
    };

    print_report(&report, &frame, &plan, matches.get_flag("json"));
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn decode_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let stripped = input.trim().trim_start_matches("0x");
    if stripped.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(stripped)
}

fn print_report(report: &ExecutionReport, frame: &CallFrame, plan: &Plan, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(report) {
            Ok(serialized) => println!("{serialized}"),
            Err(err) => error!(%err, "could not serialize the report"),
        }
        return;
    }

    info!(result = ?report.result, "execution finished");
    info!(
        gas_used = report.gas_used,
        gas_remaining = report.gas_remaining,
        memory_bytes = frame.memory.size(),
        stream_elements = plan.len(),
        "frame totals"
    );
    if !report.output.is_empty() {
        info!(output = %hex::encode(&report.output), "returned data");
    }
    for (index, log) in report.logs.iter().enumerate() {
        info!(index, topics = log.topics.len(), data = %hex::encode(&log.data), "log");
    }
    for (address, beneficiary) in &report.selfdestructs {
        info!(?address, ?beneficiary, "selfdestruct");
    }
    for (depth, value) in frame.stack.values().iter().rev().enumerate() {
        info!(depth, %value, "stack");
    }
}
