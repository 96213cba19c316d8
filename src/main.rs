use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use ductus_bench::{
    BenchmarkConfig, BenchmarkEvaluator, BenchmarkReport, ComparisonSet, EerPoint,
};
use ductus_dtw::{FeatureMatrix, nearest_neighbors};
use ductus_verify::{
    Channel, Classifier, ConditionalSequence, InputDevice, MinMaxClassifier, NeighborsClassifier,
    Origin, Score, Signature, SignatureId, SignerModel, SingleReferenceClassifier,
    StatisticsClassifier, StatisticsKey, StatisticsTable, ThresholdTriple, TrainingStatistics,
};
use ductus_io::{
    ComparisonReader, NeighborhoodStore, ResultWriter, RunName, SignatureNeighborhood,
    StatisticsStore, TraceReader,
};

#[derive(Parser)]
#[command(name = "ductus")]
#[command(about = "Online signature verification from pen trajectory traces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input and output arguments shared by every verification run.
#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Directory of trace CSV files, one per signature
    #[arg(long)]
    traces: PathBuf,

    /// Comparison list file (`reference questioned label` per line)
    #[arg(long)]
    comparisons: PathBuf,

    /// Run name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    run: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Channels used for distance computation, comma separated
    #[arg(long, default_value = "x,y,pressure")]
    channels: String,

    /// Number of thresholds swept by the benchmark
    #[arg(long, default_value_t = 1000)]
    resolution: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Score each comparison against its reference signature alone,
    /// using fixed externally supplied thresholds
    Single {
        #[command(flatten)]
        run: RunArgs,

        /// Distance below which a comparison is confidently genuine
        #[arg(long, default_value_t = 40.0)]
        genuine_threshold: f64,

        /// Distance at which the score crosses 0.5
        #[arg(long, default_value_t = 50.0)]
        inconclusive_threshold: f64,

        /// Distance above which a comparison is confidently forged
        #[arg(long, default_value_t = 60.0)]
        forgery_threshold: f64,
    },

    /// Train one model per signer from its reference signatures, with
    /// thresholds derived from reference-to-reference distances
    Minmax {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Train one model per reference signature from its nearest
    /// neighbors among the other references
    Neighbors {
        #[command(flatten)]
        run: RunArgs,

        /// Separation between the genuine band and the forgery
        /// threshold (forgery = scale x average pair distance)
        #[arg(long, default_value_t = 5.0)]
        scale: f64,

        /// Neighbors per reference when computing neighborhoods
        #[arg(long, default_value_t = 3)]
        k: usize,

        /// Neighborhood file (`primary n1..nk d1..dk` per line);
        /// loaded when present, written after the all-pairs search
        /// otherwise
        #[arg(long)]
        neighborhood_file: PathBuf,
    },

    /// Score comparisons from population-level distance statistics,
    /// training them once and reloading on later runs
    Stats {
        #[command(flatten)]
        run: RunArgs,

        /// Statistics file; loaded when present, written after training
        /// otherwise
        #[arg(long)]
        stats_file: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct RunOutput {
    run: String,
    strategy: &'static str,
    n_traces: usize,
    n_comparisons: usize,
    n_scored: usize,
    n_skipped: usize,
    eer: Option<EerPoint>,
}

fn parse_channels(s: &str) -> Result<Vec<Channel>> {
    s.split(',')
        .map(|c| match c.trim() {
            "x" => Ok(Channel::X),
            "y" => Ok(Channel::Y),
            "pressure" => Ok(Channel::Pressure),
            other => anyhow::bail!("unknown channel: {other} (expected x, y, or pressure)"),
        })
        .collect()
}

/// Load every `.csv` trace under `dir`, keyed by signature id.
///
/// Unreadable or invalid traces are logged and skipped; one bad file
/// must not abort the batch.
fn load_traces(dir: &Path) -> Result<HashMap<String, Signature>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read trace directory {}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let pipeline = ConditionalSequence::standard();
    let loaded: Vec<Option<Signature>> = paths
        .par_iter()
        .map(|path| match TraceReader::new(path).read() {
            Ok(mut signature) => {
                pipeline.run(&mut signature);
                Some(signature)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable trace");
                None
            }
        })
        .collect();

    let mut traces = HashMap::new();
    for signature in loaded.into_iter().flatten() {
        traces.insert(signature.id().as_str().to_owned(), signature);
    }
    if traces.is_empty() {
        anyhow::bail!("no usable traces in {}", dir.display());
    }
    info!(n_traces = traces.len(), "traces loaded and preprocessed");
    Ok(traces)
}

/// Score every comparison whose model and traces resolve, attaching
/// the flipped (probability-of-forgery) prediction plus the model
/// thresholds as diagnostic metadata.
///
/// `model_for` maps a comparison's reference id to the trained model
/// that should judge it. Failures are logged and leave the comparison
/// unscored.
fn score_comparisons<'m, C: Classifier + Sync>(
    comparisons: &mut ComparisonSet,
    traces: &HashMap<String, Signature>,
    classifier: &C,
    model_for: impl Fn(&str) -> Option<&'m SignerModel> + Sync,
) {
    let inputs: Vec<(String, String)> = comparisons
        .iter()
        .map(|c| {
            (
                c.reference().as_str().to_owned(),
                c.questioned().as_str().to_owned(),
            )
        })
        .collect();

    let scores: Vec<Option<(Score, f64, f64)>> = inputs
        .par_iter()
        .map(|(reference, questioned)| {
            let Some(model) = model_for(reference) else {
                warn!(%reference, "no model for reference, skipping comparison");
                return None;
            };
            let Some(trace) = traces.get(questioned) else {
                warn!(%questioned, "questioned trace missing, skipping comparison");
                return None;
            };
            match classifier.test(model, trace) {
                Ok(score) => Some((
                    score,
                    model.genuine_threshold(),
                    model.forgery_threshold(),
                )),
                Err(e) => {
                    warn!(%reference, %questioned, error = %e, "scoring failed, skipping comparison");
                    None
                }
            }
        })
        .collect();

    for (comparison, outcome) in comparisons.iter_mut().zip(scores) {
        if let Some((score, genuine, forgery)) = outcome {
            comparison.set_prediction(score.complement());
            comparison.add_metadata("genuine_threshold", genuine);
            comparison.add_metadata("forgery_threshold", forgery);
        }
    }
    comparisons.refresh_keys();
}

/// Drop unscored comparisons so the evaluator sees a fully scored set.
fn scored_subset(comparisons: &ComparisonSet) -> (ComparisonSet, usize) {
    let scored: ComparisonSet = comparisons
        .iter()
        .filter(|c| c.prediction().is_some())
        .cloned()
        .collect();
    let skipped = comparisons.len() - scored.len();
    if skipped > 0 {
        warn!(skipped, "comparisons left unscored");
    }
    (scored, skipped)
}

/// Evaluate, persist and summarize one scored run.
fn finish_run(
    run: &RunArgs,
    strategy: &'static str,
    n_traces: usize,
    comparisons: &ComparisonSet,
) -> Result<()> {
    let (scored, skipped) = scored_subset(comparisons);
    let report: Option<BenchmarkReport> = if scored.is_empty() {
        warn!("no comparisons scored, skipping benchmark");
        None
    } else {
        let evaluator = BenchmarkEvaluator::new(BenchmarkConfig {
            resolution: run.resolution,
        });
        Some(evaluator.evaluate(&scored)?)
    };
    let eer = report.as_ref().and_then(|r| r.eer());
    if let Some(point) = &eer {
        info!(
            threshold = point.threshold,
            far = point.far,
            frr = point.frr,
            "equal error rate"
        );
    } else {
        warn!("no equal error rate: benchmark degenerate or empty");
    }

    let writer = ResultWriter::new(&run.output_dir, RunName::new(run.run.clone())?)?;
    writer.write_predictions(comparisons)?;
    writer.write_results(comparisons)?;
    if let Some(report) = &report {
        writer.write_benchmark(report)?;
    }
    writer.write_summary(&scored, eer)?;

    let output = RunOutput {
        run: run.run.clone(),
        strategy,
        n_traces,
        n_comparisons: comparisons.len(),
        n_scored: scored.len(),
        n_skipped: skipped,
        eer,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_single(
    run: RunArgs,
    genuine: f64,
    inconclusive: f64,
    forgery: f64,
) -> Result<()> {
    let channels = parse_channels(&run.channels)?;
    let thresholds = ThresholdTriple::new(genuine, inconclusive, forgery)?;
    let classifier = SingleReferenceClassifier::new(channels, thresholds);

    let mut comparisons = ComparisonReader::new(&run.comparisons).read()?;
    let traces = load_traces(&run.traces)?;

    // One model per distinct reference signature.
    let reference_ids: Vec<String> = {
        let mut ids: Vec<String> = comparisons
            .iter()
            .map(|c| c.reference().as_str().to_owned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    };
    let trained: Vec<(String, SignerModel)> = reference_ids
        .par_iter()
        .filter_map(|id| {
            let Some(reference) = traces.get(id) else {
                warn!(reference = %id, "reference trace missing, skipping");
                return None;
            };
            match classifier.train(std::slice::from_ref(reference)) {
                Ok(model) => Some((id.clone(), model)),
                Err(e) => {
                    warn!(reference = %id, error = %e, "training failed, skipping");
                    None
                }
            }
        })
        .collect();
    let models: HashMap<String, SignerModel> = trained.into_iter().collect();
    info!(n_models = models.len(), "reference models trained");

    score_comparisons(&mut comparisons, &traces, &classifier, |reference| {
        models.get(reference)
    });
    finish_run(&run, "single", traces.len(), &comparisons)
}

fn run_minmax(run: RunArgs) -> Result<()> {
    let channels = parse_channels(&run.channels)?;
    let classifier = MinMaxClassifier::new(channels);

    let mut comparisons = ComparisonReader::new(&run.comparisons).read()?;
    let traces = load_traces(&run.traces)?;

    // All reference signatures of one signer form its training set.
    let mut signers: HashMap<String, Vec<&Signature>> = HashMap::new();
    for comparison in comparisons.iter() {
        if let Some(reference) = traces.get(comparison.reference().as_str()) {
            let group = signers.entry(reference.signer().as_str().to_owned()).or_default();
            if !group.iter().any(|s| s.id() == reference.id()) {
                group.push(reference);
            }
        }
    }

    let groups: Vec<(String, Vec<Signature>)> = signers
        .into_iter()
        .map(|(signer, refs)| (signer, refs.into_iter().cloned().collect()))
        .collect();
    let trained: Vec<(String, SignerModel)> = groups
        .par_iter()
        .filter_map(|(signer, references)| {
            match classifier.train(references) {
                Ok(model) => Some((signer.clone(), model)),
                Err(e) => {
                    warn!(%signer, error = %e, "training failed, skipping signer");
                    None
                }
            }
        })
        .collect();
    let models: HashMap<String, SignerModel> = trained.into_iter().collect();
    info!(n_models = models.len(), "signer models trained");

    score_comparisons(&mut comparisons, &traces, &classifier, |reference| {
        let signer = traces.get(reference)?.signer().as_str();
        models.get(signer)
    });
    finish_run(&run, "minmax", traces.len(), &comparisons)
}

/// All-pairs nearest-neighbor search over the distinct reference
/// signatures of the comparison set.
///
/// The search projects onto the coordinate channels only, so stylus and
/// finger references stay mutually comparable regardless of the run's
/// channel selection.
fn build_neighborhoods(
    comparisons: &ComparisonSet,
    traces: &HashMap<String, Signature>,
    k: usize,
) -> Result<Vec<SignatureNeighborhood>> {
    let mut ids: Vec<&str> = comparisons
        .iter()
        .map(|c| c.reference().as_str())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let coordinate_channels = [Channel::X, Channel::Y];
    let mut population: Vec<(&str, FeatureMatrix)> = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(trace) = traces.get(id) else {
            warn!(reference = id, "reference trace missing, excluded from neighborhood search");
            continue;
        };
        match trace.features(&coordinate_channels) {
            Ok(features) => population.push((id, features)),
            Err(e) => {
                warn!(reference = id, error = %e, "projection failed, excluded from neighborhood search");
            }
        }
    }
    if population.is_empty() {
        anyhow::bail!("no reference traces available for the neighborhood search");
    }

    let features: Vec<FeatureMatrix> = population.iter().map(|(_, f)| f.clone()).collect();
    let matrix = ductus_dtw::Dtw::squared().pairwise(&features)?;
    info!(
        n_references = population.len(),
        k, "all-pairs distance matrix computed"
    );

    Ok(nearest_neighbors(&matrix, k)
        .into_iter()
        .map(|hood| SignatureNeighborhood {
            primary: SignatureId::new(population[hood.primary].0),
            neighbors: hood
                .neighbors
                .iter()
                .map(|n| (SignatureId::new(population[n.index].0), n.distance.value()))
                .collect(),
        })
        .collect())
}

fn run_neighbors(run: RunArgs, scale: f64, k: usize, neighborhood_file: PathBuf) -> Result<()> {
    let channels = parse_channels(&run.channels)?;
    let classifier = NeighborsClassifier::new(channels, scale)?;

    let mut comparisons = ComparisonReader::new(&run.comparisons).read()?;
    let traces = load_traces(&run.traces)?;

    let store = NeighborhoodStore::new(&neighborhood_file);
    let neighborhoods = if neighborhood_file.exists() {
        let hoods = store.load()?;
        info!(n_neighborhoods = hoods.len(), "neighborhoods loaded");
        hoods
    } else {
        let hoods = build_neighborhoods(&comparisons, &traces, k)?;
        store.save(&hoods)?;
        info!(n_neighborhoods = hoods.len(), "neighborhoods computed and saved");
        hoods
    };

    // The primary signature plus its neighbors form the training set;
    // the model is keyed by the primary signature id.
    let trained: Vec<(String, SignerModel)> = neighborhoods
        .par_iter()
        .filter_map(|hood| {
            let primary = hood.primary.as_str();
            let mut references = Vec::with_capacity(hood.neighbors.len() + 1);
            match traces.get(primary) {
                Some(trace) => references.push(trace.clone()),
                None => {
                    warn!(primary, "primary trace missing, skipping neighborhood");
                    return None;
                }
            }
            for (id, _) in &hood.neighbors {
                match traces.get(id.as_str()) {
                    Some(trace) => references.push(trace.clone()),
                    None => {
                        warn!(primary, neighbor = id.as_str(), "neighbor trace missing, skipping neighborhood");
                        return None;
                    }
                }
            }
            match classifier.train(&references) {
                Ok(model) => Some((primary.to_owned(), model)),
                Err(e) => {
                    warn!(primary, error = %e, "training failed, skipping neighborhood");
                    None
                }
            }
        })
        .collect();
    let models: HashMap<String, SignerModel> = trained.into_iter().collect();
    info!(n_models = models.len(), "neighborhood models trained");

    score_comparisons(&mut comparisons, &traces, &classifier, |reference| {
        models.get(reference)
    });
    finish_run(&run, "neighbors", traces.len(), &comparisons)
}

fn run_stats(run: RunArgs, stats_file: PathBuf) -> Result<()> {
    let channels = parse_channels(&run.channels)?;
    let mut comparisons = ComparisonReader::new(&run.comparisons).read()?;
    let traces = load_traces(&run.traces)?;

    // Per-comparison 1v1 distances, reused for both training and scoring.
    let dtw = ductus_dtw::Dtw::squared();
    let inputs: Vec<(String, String, Origin)> = comparisons
        .iter()
        .map(|c| {
            (
                c.reference().as_str().to_owned(),
                c.questioned().as_str().to_owned(),
                c.expected(),
            )
        })
        .collect();
    let distances: Vec<Option<(f64, InputDevice)>> = inputs
        .par_iter()
        .map(|(reference, questioned, _)| {
            let (reference, questioned) = (traces.get(reference)?, traces.get(questioned)?);
            let (a, b) = (
                reference.features(&channels).ok()?,
                questioned.features(&channels).ok()?,
            );
            let distance = match dtw.distance(a.as_view(), b.as_view()) {
                Ok(d) => d.value(),
                Err(e) => {
                    warn!(error = %e, "distance computation failed, skipping comparison");
                    return None;
                }
            };
            Some((distance, questioned.device()))
        })
        .collect();

    let table = if stats_file.exists() {
        info!(path = %stats_file.display(), "reusing persisted statistics");
        StatisticsStore::new(&stats_file).load()?
    } else {
        let table = train_statistics(&inputs, &distances)?;
        StatisticsStore::new(&stats_file).save(&table)?;
        table
    };

    // Per-device scorers with a pooled fallback.
    let scorer = |device: InputDevice| -> Result<StatisticsClassifier> {
        let lookup = |origin: Origin| {
            table
                .get(StatisticsKey::per_device(origin, device))
                .or_else(|| table.get(StatisticsKey::pooled(origin)))
                .copied()
                .with_context(|| format!("no {origin} statistics for {device}"))
        };
        Ok(StatisticsClassifier::new(
            &lookup(Origin::Genuine)?,
            &lookup(Origin::Forged)?,
        )?)
    };

    let scores: Vec<Option<(Score, f64)>> = distances
        .iter()
        .map(|entry| {
            let &(distance, device) = entry.as_ref()?;
            let classifier = match scorer(device) {
                Ok(classifier) => classifier,
                Err(e) => {
                    warn!(%device, error = %e, "no usable statistics, skipping comparison");
                    return None;
                }
            };
            Some((classifier.score(distance), distance))
        })
        .collect();
    for (comparison, outcome) in comparisons.iter_mut().zip(scores) {
        if let Some((score, distance)) = outcome {
            comparison.set_prediction(score.complement());
            comparison.add_metadata("distance", distance);
        }
    }
    comparisons.refresh_keys();

    finish_run(&run, "stats", traces.len(), &comparisons)
}

/// Build per-device and pooled distance statistics for both classes.
fn train_statistics(
    inputs: &[(String, String, Origin)],
    distances: &[Option<(f64, InputDevice)>],
) -> Result<StatisticsTable> {
    let mut samples: HashMap<StatisticsKey, Vec<f64>> = HashMap::new();
    for ((_, _, expected), entry) in inputs.iter().zip(distances) {
        let &(distance, device) = match entry.as_ref() {
            Some(entry) => entry,
            None => continue,
        };
        samples
            .entry(StatisticsKey::pooled(*expected))
            .or_default()
            .push(distance);
        samples
            .entry(StatisticsKey::per_device(*expected, device))
            .or_default()
            .push(distance);
    }

    let mut table = StatisticsTable::new();
    // Deterministic file order: pooled records first, then per-device.
    let mut keys: Vec<StatisticsKey> = samples.keys().copied().collect();
    keys.sort_by_key(|k| (k.device.is_some(), k.to_string()));
    for key in keys {
        let stats = TrainingStatistics::from_sample(&samples[&key])
            .with_context(|| format!("cannot summarize {key}"))?;
        table.insert(key, stats);
    }
    if table.is_empty() {
        anyhow::bail!("no comparison distances available for statistics training");
    }
    info!(n_records = table.len(), "statistics trained");
    Ok(table)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Single {
            run,
            genuine_threshold,
            inconclusive_threshold,
            forgery_threshold,
        } => run_single(
            run,
            genuine_threshold,
            inconclusive_threshold,
            forgery_threshold,
        ),
        Command::Minmax { run } => run_minmax(run),
        Command::Neighbors {
            run,
            scale,
            k,
            neighborhood_file,
        } => run_neighbors(run, scale, k, neighborhood_file),
        Command::Stats { run, stats_file } => run_stats(run, stats_file),
    }
}
