use clap::{Arg, ArgAction, Command};

pub fn cli() -> Command {
    Command::new("plevm")
        .about("Execute EVM bytecode on the plan-based interpreter")
        .arg(
            Arg::new("code")
                .required(true)
                .help("Bytecode to run, hex encoded (0x prefix optional)"),
        )
        .arg(
            Arg::new("calldata")
                .long("calldata")
                .value_name("HEX")
                .default_value("")
                .help("Calldata for the frame, hex encoded"),
        )
        .arg(
            Arg::new("gas")
                .long("gas")
                .value_name("GAS")
                .default_value("30000000")
                .help("Gas budget for the frame"),
        )
        .arg(
            Arg::new("no-fusion")
                .long("no-fusion")
                .action(ArgAction::SetTrue)
                .help("Disable PUSH fusion in the planner"),
        )
        .arg(
            Arg::new("initcode")
                .long("initcode")
                .action(ArgAction::SetTrue)
                .help("Validate as initcode (EIP-3860 limit and word gas)"),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .action(ArgAction::SetTrue)
                .help("Log every executed step"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the execution report as JSON"),
        )
        .arg(
            Arg::new("log.level")
                .long("log.level")
                .default_value("info")
                .help("error | warn | info | debug | trace"),
        )
}
