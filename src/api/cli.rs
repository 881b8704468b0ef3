use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};

use super::{AppState, FieldName, field_bounds, run_http_server};
use crate::core::{
    Calculator, CalculatorForm, CalculatorKind, ChartBoard, GstDirection, calculate,
    clamp_input_if_out_of_range, format_currency, format_indian_compact, slider_amount,
    slider_position, snap_slider_pos, validate_number_input,
};
use crate::store::{KvStore, Notes, Preferences, Theme, default_data_dir};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliCalculator {
    Sip,
    Lumpsum,
    Gst,
    Emi,
}

impl From<CliCalculator> for CalculatorKind {
    fn from(value: CliCalculator) -> Self {
        match value {
            CliCalculator::Sip => CalculatorKind::Sip,
            CliCalculator::Lumpsum => CalculatorKind::Lumpsum,
            CliCalculator::Gst => CalculatorKind::Gst,
            CliCalculator::Emi => CalculatorKind::Emi,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliGstDirection {
    Add,
    Remove,
}

impl From<CliGstDirection> for GstDirection {
    fn from(value: CliGstDirection) -> Self {
        match value {
            CliGstDirection::Add => GstDirection::Add,
            CliGstDirection::Remove => GstDirection::Remove,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliField {
    Amount,
    Rate,
    #[value(alias = "tenure")]
    Period,
}

impl From<CliField> for FieldName {
    fn from(value: CliField) -> Self {
        match value {
            CliField::Amount => FieldName::Amount,
            CliField::Rate => FieldName::Rate,
            CliField::Period => FieldName::Period,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTheme {
    Light,
    Dark,
}

impl From<CliTheme> for Theme {
    fn from(value: CliTheme) -> Self {
        match value {
            CliTheme::Light => Theme::Light,
            CliTheme::Dark => Theme::Dark,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Parser, Debug)]
#[command(
    name = "smartfin",
    version,
    about = "SIP, lumpsum, GST and EMI calculators with a notes pad and a small web UI"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "SMARTFIN_DATA_DIR",
        help = "Directory holding storage.json; defaults to <data dir>/smartfin"
    )]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, help = "Draw the growth and breakdown charts")]
    chart: bool,
    #[arg(long, conflicts_with = "chart", help = "Print the result as JSON")]
    json: bool,
    #[arg(long, default_value_t = 40)]
    width: usize,
}

/// Raw text is accepted as-is and run through the same clamping as the web form.
#[derive(Args, Debug, Clone)]
pub struct GrowthArgs {
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Expected annual return in percent")]
    rate: Option<String>,
    #[arg(long, visible_alias = "years", allow_hyphen_values = true)]
    period: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GstArgs {
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "GST rate in percent")]
    rate: Option<String>,
    #[arg(long, value_enum, default_value_t = CliGstDirection::Add)]
    direction: CliGstDirection,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EmiArgs {
    #[arg(long, allow_hyphen_values = true, help = "Loan principal")]
    amount: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Annual interest rate in percent")]
    rate: Option<String>,
    #[arg(long, visible_alias = "years", allow_hyphen_values = true)]
    tenure: Option<String>,
    #[arg(long, help = "Print the yearly amortization schedule")]
    schedule: bool,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "SMARTFIN_HOST", default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "SMARTFIN_PORT", default_value_t = 8080)]
    port: u16,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Monthly SIP future value
    Sip(GrowthArgs),
    /// One-time investment future value
    Lumpsum(GrowthArgs),
    /// Add or remove GST
    Gst(GstArgs),
    /// Loan EMI and amortization
    Emi(EmiArgs),
    /// Map between slider positions and amounts
    Slider {
        #[arg(long, value_enum)]
        calculator: CliCalculator,
        #[arg(long, conflicts_with = "amount", required_unless_present = "amount")]
        pos: Option<f64>,
        #[arg(long)]
        amount: Option<f64>,
    },
    /// Show how a typed value is clamped while typing and on blur
    Clamp {
        #[arg(long, value_enum)]
        calculator: CliCalculator,
        #[arg(long, value_enum)]
        field: CliField,
        #[arg(allow_hyphen_values = true, default_value = "")]
        value: String,
    },
    /// Evaluate arithmetic expressions; ANS refers to the previous answer
    Calc {
        #[arg(required = true, allow_hyphen_values = true)]
        expressions: Vec<String>,
    },
    /// Read or edit the notes pad
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },
    /// Read or change saved preferences
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
    /// Run the HTTP API and web UI
    Serve(ServeArgs),
}

#[derive(Subcommand, Debug, Clone)]
pub enum NotesAction {
    Show,
    Set { text: String },
    Clear,
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PrefsAction {
    Show {
        #[arg(long, help = "Treat the OS as preferring a dark theme")]
        os_dark: bool,
    },
    Theme {
        #[arg(value_enum)]
        theme: CliTheme,
    },
    Sliders {
        #[arg(value_enum)]
        state: Toggle,
    },
}

fn open_store(data_dir: Option<&Path>) -> KvStore {
    let dir = data_dir.map(Path::to_path_buf).unwrap_or_else(default_data_dir);
    let mut store = KvStore::open(&dir);
    store.initialize();
    store
}

pub async fn run_cli(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve(args) => {
            let store = open_store(cli.data_dir.as_deref());
            run_http_server(&args.host, args.port, AppState::new(store))
                .await
                .map_err(|e| format!("server error: {e}"))
        }
        command => {
            let output = execute(&command, cli.data_dir.as_deref())?;
            print!("{output}");
            Ok(())
        }
    }
}

/// Runs every command except `serve` and returns what it would print.
pub fn execute(command: &Command, data_dir: Option<&Path>) -> Result<String, String> {
    match command {
        Command::Sip(args) => run_growth(CalculatorKind::Sip, args),
        Command::Lumpsum(args) => run_growth(CalculatorKind::Lumpsum, args),
        Command::Gst(args) => run_gst(args),
        Command::Emi(args) => run_emi(args),
        Command::Slider {
            calculator,
            pos,
            amount,
        } => run_slider((*calculator).into(), *pos, *amount),
        Command::Clamp {
            calculator,
            field,
            value,
        } => run_clamp((*calculator).into(), (*field).into(), value),
        Command::Calc { expressions } => Ok(run_calc(expressions)),
        Command::Notes { action } => run_notes(action, &mut open_store(data_dir)),
        Command::Prefs { action } => run_prefs(action.as_ref(), &mut open_store(data_dir)),
        Command::Serve(_) => Err("serve must be run through run_cli".to_string()),
    }
}

fn apply_text(field: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}

fn run_growth(kind: CalculatorKind, args: &GrowthArgs) -> Result<String, String> {
    let mut form = CalculatorForm::with_defaults(kind);
    apply_text(&mut form.amount, &args.amount);
    apply_text(&mut form.rate, &args.rate);
    apply_text(&mut form.period, &args.period);
    render_form(&form, &args.output, false)
}

fn run_gst(args: &GstArgs) -> Result<String, String> {
    let mut form = CalculatorForm::with_defaults(CalculatorKind::Gst);
    apply_text(&mut form.amount, &args.amount);
    apply_text(&mut form.rate, &args.rate);
    form.direction = args.direction.into();
    render_form(&form, &args.output, false)
}

fn run_emi(args: &EmiArgs) -> Result<String, String> {
    let mut form = CalculatorForm::with_defaults(CalculatorKind::Emi);
    apply_text(&mut form.amount, &args.amount);
    apply_text(&mut form.rate, &args.rate);
    apply_text(&mut form.period, &args.tenure);
    render_form(&form, &args.output, args.schedule)
}

fn render_form(form: &CalculatorForm, output: &OutputArgs, schedule: bool) -> Result<String, String> {
    let inputs = form.validate();
    let calc = calculate(form.kind, inputs)
        .ok_or_else(|| "amount, rate and period must all be positive".to_string())?;

    if output.json {
        return serde_json::to_string_pretty(&calc)
            .map(|json| json + "\n")
            .map_err(|e| format!("failed to encode result: {e}"));
    }

    let mut out = String::new();
    let period = inputs
        .period
        .map(|p| format!(", {p} years"))
        .unwrap_or_default();
    out.push_str(&format!(
        "Inputs: {} at {}%{period}\n",
        format_currency(inputs.amount),
        inputs.rate
    ));
    for (label, value) in calc.summary() {
        out.push_str(&format!("{label:>15}: {value}\n"));
    }

    if schedule {
        if let crate::core::Calculation::Emi { result, .. } = &calc {
            out.push_str(&format!(
                "\n{:>5} {:>18} {:>18} {:>18}\n",
                "Year", "Principal", "Interest", "Balance"
            ));
            for row in &result.amortization_by_year {
                out.push_str(&format!(
                    "{:>5} {:>18} {:>18} {:>18}\n",
                    row.label,
                    format_currency(row.principal_paid),
                    format_currency(row.interest_paid),
                    format_currency(row.balance)
                ));
            }
        }
    }

    if output.chart {
        let mut board = ChartBoard::new();
        board.apply(&calc.chart_update());
        out.push('\n');
        out.push_str(&board.render_text(output.width));
    }
    Ok(out)
}

fn run_slider(kind: CalculatorKind, pos: Option<f64>, amount: Option<f64>) -> Result<String, String> {
    match (pos, amount) {
        (Some(pos), None) => {
            let pos = snap_slider_pos(pos);
            let amount = slider_amount(kind, pos);
            Ok(format!(
                "position {pos} -> {} ({})\n",
                amount,
                format_indian_compact(amount, true)
            ))
        }
        (None, Some(amount)) => Ok(format!(
            "amount {amount} -> position {}\n",
            slider_position(kind, amount)
        )),
        _ => Err("pass exactly one of --pos or --amount".to_string()),
    }
}

fn run_clamp(kind: CalculatorKind, field: FieldName, value: &str) -> Result<String, String> {
    let bounds = field_bounds(kind, field)?;
    let live = match clamp_input_if_out_of_range(value, bounds).value() {
        Some(v) => v.to_string(),
        None => "(unchanged)".to_string(),
    };
    Ok(format!(
        "range [{}, {}]\nwhile typing: {live}\non blur: {}\n",
        bounds.min,
        bounds.max,
        validate_number_input(value, bounds)
    ))
}

fn run_calc(expressions: &[String]) -> String {
    let mut calculator = Calculator::new();
    let mut out = String::new();
    for expression in expressions {
        match calculator.evaluate(expression) {
            Ok(Some(value)) => out.push_str(&format!("{} {value}\n", calculator.history())),
            Ok(None) => {}
            Err(e) => out.push_str(&format!("{expression}: {e}\n")),
        }
    }
    out
}

fn run_notes(action: &NotesAction, store: &mut KvStore) -> Result<String, String> {
    let mut notes = Notes::new(store);
    match action {
        NotesAction::Show => {
            let mut text = notes.load();
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            Ok(text)
        }
        NotesAction::Set { text } => saved_or_err(notes.save(text), "notes saved\n"),
        NotesAction::Clear => saved_or_err(notes.clear(), "notes cleared\n"),
        NotesAction::Export { dir } => notes
            .export(dir, Utc::now())
            .map(|path| format!("{}\n", path.display()))
            .map_err(|e| e.to_string()),
    }
}

fn run_prefs(action: Option<&PrefsAction>, store: &mut KvStore) -> Result<String, String> {
    let mut prefs = Preferences::new(store);
    let os_dark = match action {
        Some(PrefsAction::Theme { theme }) => {
            if !prefs.set_theme((*theme).into()) {
                return Err("storage unavailable, theme not saved".to_string());
            }
            false
        }
        Some(PrefsAction::Sliders { state }) => {
            if !prefs.set_sliders_enabled(*state == Toggle::On) {
                return Err("storage unavailable, slider preference not saved".to_string());
            }
            false
        }
        Some(PrefsAction::Show { os_dark }) => *os_dark,
        None => false,
    };

    let snap = prefs.snapshot(os_dark);
    let source = if snap.theme_saved { "saved" } else { "os default" };
    Ok(format!(
        "theme: {} ({source})\nsliders: {}\n",
        snap.theme.as_str(),
        if snap.sliders_enabled { "on" } else { "off" }
    ))
}

fn saved_or_err(saved: bool, message: &str) -> Result<String, String> {
    if saved {
        Ok(message.to_string())
    } else {
        Err("storage unavailable, nothing was saved".to_string())
    }
}
