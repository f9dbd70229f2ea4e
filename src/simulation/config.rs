//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::strategy::DeliveryKind;
use crate::tuning::BowlingSide;

/// Simulation mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum SimMode {
    /// Bowl one delivery
    #[default]
    Single,
    /// Bowl the same delivery repeatedly with consecutive seeds
    Batch { count: u32 },
    /// Every combination of kinds, strengths, directions and lengths
    Sweep { per_cell: u32 },
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub mode: SimMode,
    pub kind: DeliveryKind,
    pub side: BowlingSide,
    /// Bounce target on the pitch
    pub target: [f32; 3],
    /// Locked strength (0..1)
    pub strength: f32,
    /// Direction input (-100..100, as the UI slider sends it)
    pub direction: f32,
    /// Release speed for spin deliveries
    pub release_speed: f32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Give up on a delivery after this many fixed ticks
    pub max_ticks: u32,
    /// Alternative tuning file (None = config/delivery_tuning.json)
    pub tuning_file: Option<String>,
    /// Output file path for the JSON report (None = stdout summary only)
    pub output_file: Option<String>,
    /// Write a text event log per delivery
    pub log_events: bool,
    pub log_dir: String,
    /// Suppress progress output
    pub quiet: bool,
    /// Number of parallel threads (0 = sequential, N = N threads)
    pub parallel: usize,
    /// Sweep axes (empty = built-in defaults)
    pub kinds: Vec<DeliveryKind>,
    pub strengths: Vec<f32>,
    pub directions: Vec<f32>,
    /// Bounce distances down the pitch
    pub lengths: Vec<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Single,
            kind: DeliveryKind::Swing,
            side: BowlingSide::OverTheWicket,
            target: [0.0, 0.0, 16.0],
            strength: 1.0,
            direction: 0.0,
            release_speed: crate::constants::DEFAULT_SPIN_SPEED,
            seed: None,
            max_ticks: 1000,
            tuning_file: None,
            output_file: None,
            log_events: false,
            log_dir: "sim_logs".to_string(),
            quiet: false,
            parallel: 0,
            kinds: Vec::new(),
            strengths: Vec::new(),
            directions: Vec::new(),
            lengths: Vec::new(),
        }
    }
}

/// Local simulation settings
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

impl SimConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Settings file if present, otherwise built-in defaults
    pub fn from_config_files() -> Self {
        Self::from_file(SIM_SETTINGS_FILE).unwrap_or_default()
    }

    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            print_help();
            std::process::exit(0);
        }

        let mut config = Self::from_config_files();

        // Explicit settings file replaces the base before overrides apply
        if let Some(pos) = args.iter().position(|a| a == "--settings") {
            if let Some(path) = args.get(pos + 1) {
                match Self::from_file(path) {
                    Ok(loaded) => config = loaded,
                    Err(e) => eprintln!("Warning: {}", e),
                }
            }
        }

        config.apply_args(&args[1.min(args.len())..]);
        config
    }

    /// Apply command line overrides. Unknown flags are ignored.
    pub fn apply_args(&mut self, args: &[String]) {
        let mut i = 0;
        while i < args.len() {
            let next = args.get(i + 1);
            match args[i].as_str() {
                "--settings" => {
                    // Already handled by from_args
                    i += 1;
                }
                "--kind" => {
                    if let Some(kind) = next.and_then(|s| DeliveryKind::from_str(s)) {
                        self.kind = kind;
                    }
                    i += 1;
                }
                "--side" => {
                    if let Some(side) = next.and_then(|s| BowlingSide::from_str(s)) {
                        self.side = side;
                    }
                    i += 1;
                }
                "--target" => {
                    if let Some(target) = next.and_then(|s| parse_triple(s)) {
                        self.target = target;
                    }
                    i += 1;
                }
                "--strength" => {
                    if let Some(value) = next.and_then(|s| s.parse().ok()) {
                        self.strength = value;
                    }
                    i += 1;
                }
                "--direction" => {
                    if let Some(value) = next.and_then(|s| s.parse().ok()) {
                        self.direction = value;
                    }
                    i += 1;
                }
                "--speed" => {
                    if let Some(value) = next.and_then(|s| s.parse().ok()) {
                        self.release_speed = value;
                    }
                    i += 1;
                }
                "--count" => {
                    let count = next.and_then(|s| s.parse().ok()).unwrap_or(10);
                    self.mode = SimMode::Batch { count };
                    i += 1;
                }
                "--sweep" => {
                    let per_cell = match next.filter(|s| !s.starts_with('-')) {
                        Some(s) => {
                            i += 1;
                            s.parse().unwrap_or(1)
                        }
                        None => 1,
                    };
                    self.mode = SimMode::Sweep { per_cell };
                }
                "--kinds" => {
                    if let Some(list) = next {
                        self.kinds = list.split(',').filter_map(DeliveryKind::from_str).collect();
                    }
                    i += 1;
                }
                "--strengths" => {
                    if let Some(list) = next {
                        self.strengths = parse_list(list);
                    }
                    i += 1;
                }
                "--directions" => {
                    if let Some(list) = next {
                        self.directions = parse_list(list);
                    }
                    i += 1;
                }
                "--lengths" => {
                    if let Some(list) = next {
                        self.lengths = parse_list(list);
                    }
                    i += 1;
                }
                "--seed" => {
                    self.seed = next.and_then(|s| s.parse().ok());
                    i += 1;
                }
                "--max-ticks" => {
                    if let Some(value) = next.and_then(|s| s.parse().ok()) {
                        self.max_ticks = value;
                    }
                    i += 1;
                }
                "--tuning" => {
                    self.tuning_file = next.cloned();
                    i += 1;
                }
                "--output" => {
                    self.output_file = next.cloned();
                    i += 1;
                }
                "--log-events" => {
                    self.log_events = true;
                }
                "--log-dir" => {
                    if let Some(dir) = next {
                        self.log_dir = dir.clone();
                    }
                    i += 1;
                }
                "--quiet" | "-q" => {
                    self.quiet = true;
                }
                "--parallel" => {
                    self.parallel = next.and_then(|s| s.parse().ok()).unwrap_or(0);
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }
    }
}

fn parse_list(s: &str) -> Vec<f32> {
    s.split(',').filter_map(|v| v.trim().parse().ok()).collect()
}

fn parse_triple(s: &str) -> Option<[f32; 3]> {
    match parse_list(s).as_slice() {
        [x, y, z] => Some([*x, *y, *z]),
        // Two values are x and z on the pitch surface
        [x, z] => Some([*x, 0.0, *z]),
        _ => None,
    }
}

fn print_help() {
    println!(
        r#"Bowling Simulation Tool - headless deliveries for tuning and regression

USAGE:
    cargo run --bin simulate -- [OPTIONS]

OPTIONS:
    --settings <FILE>    Load settings from JSON file (CLI args override file settings)
    --kind <KIND>        swing or spin (default: swing)
    --side <SIDE>        over or around (default: over)
    --target <X,Z>       Bounce target, also accepts X,Y,Z (default: 0,16)
    --strength <S>       Locked strength 0..1 (default: 1.0)
    --direction <D>      Direction input -100..100 (default: 0)
    --speed <V>          Spin release speed (default: 20)
    --count <N>          Bowl N deliveries with consecutive seeds
    --sweep [N]          Sweep kinds x strengths x directions x lengths, N per cell
    --kinds <LIST>       Sweep kinds (e.g. "swing,spin")
    --strengths <LIST>   Sweep strengths (e.g. "0.5,0.75,1.0")
    --directions <LIST>  Sweep direction inputs (e.g. "-100,0,100")
    --lengths <LIST>     Sweep bounce distances (e.g. "12,15,18")
    --seed <N>           RNG seed for reproducibility
    --max-ticks <N>      Abandon a delivery after N fixed ticks (default: 1000)
    --tuning <FILE>      Delivery tuning file (default: config/delivery_tuning.json)
    --output <FILE>      Write the JSON report to a file
    --log-events         Write a text event log per delivery
    --log-dir <DIR>      Event log directory (default: sim_logs)
    --quiet, -q          Suppress progress output
    --parallel <N>       Run deliveries in parallel with N threads
    --help, -h           Show this help

EXAMPLES:
    # One full-strength swing delivery on a good length
    cargo run --bin simulate -- --target 0.2,16 --strength 1.0

    # 50 spin deliveries at 70% accuracy
    cargo run --bin simulate -- --kind spin --strength 0.7 --count 50 --seed 7

    # Sweep in parallel and save the report
    cargo run --bin simulate -- --sweep 3 --lengths "12,15,18" --parallel 8 --output sweep.json
"#
    );
}
