use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chef_core::batch::job::{ARTIFACT_EXT, encode_file};
use chef_core::container::{artifact_to_string, parse_artifact, read_artifact};
use chef_core::domain::{file_info, recipe_book};
use chef_core::error::{ChefError, Result};
use chef_core::mime;
use chef_core::plan::{BatchProfile, plan};
use chef_core::store::FileStore;
use chef_core::store_factory::{Backend, open_store};
use chef_core::{
    Codec, CodecConfig, EncodedPayload, MemoryBudget, Operation, PlannerPolicy, Recipe, jobs_for,
    run_batch,
};
use tracing::{info, warn};

use crate::presentation::cli::{CodecArgs, PlanArgs};

/// Share of available memory a batch claims when no budget is given.
const DEFAULT_MEMORY_FRACTION: f64 = 0.5;
const FALLBACK_BUDGET_MIB: u64 = 512;

fn store() -> Arc<dyn FileStore> {
    open_store(Backend::Fs)
}

/// Without `--recipe`, decoding follows whatever each artifact declares.
fn codec_from_args(args: &CodecArgs, fallback: Recipe) -> Result<Codec> {
    let recipe = match &args.recipe {
        Some(name) => name.parse()?,
        None => fallback,
    };
    Codec::new(CodecConfig {
        recipe,
        compression: args.compression.parse()?,
        verification: args.verification.parse()?,
        level: args.level,
        chunk_size: None,
        recipe_from_header: args.recipe.is_none(),
    })
}

fn decode_payload(payload: &EncodedPayload, args: &CodecArgs) -> Result<(Vec<u8>, Option<String>)> {
    codec_from_args(args, Recipe::default())?.decode(payload)
}

fn read_stdin() -> Result<String> {
    let mut s = String::new();
    std::io::stdin().read_to_string(&mut s)?;
    Ok(s)
}

pub fn handle_encode(text: Option<String>, args: CodecArgs) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => read_stdin()?,
    };
    let codec = codec_from_args(&args, Recipe::default())?;
    let payload = codec.encode(text.as_bytes(), Some("text/plain"))?;
    let stats = codec.encoding_stats(text.as_bytes(), &payload);
    std::io::stdout().write_all(artifact_to_string(&payload)?.as_bytes())?;
    eprintln!(
        "{} bytes -> {} symbols ({} bits each), ratio {:.2} (theoretical {:.2})",
        stats.original_bytes,
        stats.encoded_length,
        stats.bits_per_symbol,
        stats.actual_ratio,
        stats.theoretical_ratio
    );
    Ok(())
}

pub fn handle_decode(artifact: Option<String>, args: CodecArgs) -> Result<()> {
    let artifact = match artifact {
        Some(a) => a,
        None => read_stdin()?,
    };
    let payload = parse_artifact(&artifact)?;
    let (data, _) = decode_payload(&payload, &args)?;
    let text =
        String::from_utf8(data).map_err(|e| ChefError::Decode(format!("not UTF-8 text: {e}")))?;
    println!("{text}");
    Ok(())
}

pub fn handle_encode_file(input: PathBuf, output: Option<PathBuf>, args: CodecArgs) -> Result<()> {
    let store = store();
    let fallback = Recipe::suggest(store.size(&input)?);
    let codec = codec_from_args(&args, fallback)?;
    let output = output.unwrap_or_else(|| {
        let mut name = input.clone().into_os_string();
        name.push(format!(".{ARTIFACT_EXT}"));
        PathBuf::from(name)
    });
    let stats = encode_file(&codec, store.as_ref(), &input, &output)?;
    eprintln!(
        "{} -> {} ({} recipe, {} -> {} bytes, {:.2}x, {} ms)",
        input.display(),
        output.display(),
        codec.config().recipe,
        stats.input_size,
        stats.output_size,
        stats.ratio,
        stats.elapsed.as_millis()
    );
    Ok(())
}

pub fn handle_decode_file(input: PathBuf, output: Option<PathBuf>, args: CodecArgs) -> Result<()> {
    let store = store();
    let payload = read_artifact(store.read_all(&input)?.as_slice())?;
    let (data, mime_type) = decode_payload(&payload, &args)?;
    let output = output.unwrap_or_else(|| decoded_path(&input, mime_type.as_deref()));
    store.write_all(&output, &data)?;
    eprintln!(
        "{} -> {} ({} bytes, {})",
        input.display(),
        output.display(),
        data.len(),
        mime_type.as_deref().unwrap_or(mime::DEFAULT_MIME)
    );
    Ok(())
}

/// `notes.txt.emoji` decodes next to itself as `notes_decoded.txt`.
fn decoded_path(input: &Path, mime_type: Option<&str>) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = name
        .strip_suffix(&format!(".{ARTIFACT_EXT}"))
        .unwrap_or(&name)
        .to_string();
    let base = Path::new(&base);
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = mime_type
        .and_then(mime::extension_for)
        .map(str::to_owned)
        .or_else(|| base.extension().map(|e| e.to_string_lossy().into_owned()));
    let file = match ext {
        Some(ext) => format!("{stem}_decoded.{ext}"),
        None => format!("{stem}_decoded"),
    };
    input.with_file_name(file)
}

pub fn handle_batch(
    operation: String,
    out_dir: PathBuf,
    inputs: Vec<PathBuf>,
    args: CodecArgs,
    plan_args: PlanArgs,
) -> Result<ExitCode> {
    let op: Operation = operation.parse()?;
    let store = store();
    let mut files = Vec::new();
    for root in &inputs {
        files.extend(store.list(root)?);
    }
    let jobs = jobs_for(&files, &out_dir, op);

    let codec = codec_from_args(&args, Recipe::default())?;
    let policy = match &plan_args.policy {
        Some(path) => PlannerPolicy::from_json_file(path)?,
        None => PlannerPolicy::default(),
    };
    let budget = match plan_args.memory_mb {
        Some(mib) => MemoryBudget::from_mib(mib),
        None => {
            let detected = MemoryBudget::detect(DEFAULT_MEMORY_FRACTION);
            if detected.bytes() == 0 {
                warn!("available memory unknown, assuming {FALLBACK_BUDGET_MIB} MiB");
                MemoryBudget::from_mib(FALLBACK_BUDGET_MIB)
            } else {
                detected
            }
        }
    };
    let profile = BatchProfile::from_jobs(&jobs, store.as_ref());
    let batch_plan = plan(&profile, codec.config().recipe, budget, plan_args.cores, &policy)?;
    info!(
        files = profile.file_count,
        bytes = profile.total_bytes,
        threads = batch_plan.thread_count,
        batch = batch_plan.batch_size,
        chunk = batch_plan.chunk_size,
        "planned batch"
    );

    let report = run_batch(jobs, &batch_plan, &codec, store.as_ref())?;
    for o in &report.outcomes {
        if let Ok(s) = &o.result {
            println!(
                "ok    {} -> {} ({} -> {} bytes)",
                o.job.input_path.display(),
                o.job.output_path.display(),
                s.input_size,
                s.output_size
            );
        }
    }
    for o in report.failures() {
        if let Err(e) = &o.result {
            println!("error {}: {e}", o.job.input_path.display());
        }
    }
    eprintln!(
        "{op}: {} succeeded, {} failed, {} -> {} bytes, {} threads, {} ms",
        report.succeeded(),
        report.failed(),
        report.total_input(),
        report.total_output(),
        batch_plan.thread_count,
        report.elapsed.as_millis()
    );
    Ok(if report.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)
        .map_err(|e| ChefError::Configuration(format!("json: {e}")))?;
    println!("{s}");
    Ok(())
}

pub fn handle_info(path: PathBuf, json: bool) -> Result<()> {
    let info = file_info(store().as_ref(), &path)?;
    if json {
        return print_json(&info);
    }
    println!("path:      {}", info.path.display());
    println!("size:      {} bytes", info.size);
    println!("mime:      {}", info.mime_type);
    println!(
        "suggested: {} (base {})",
        info.suggested_recipe,
        info.suggested_recipe.base()
    );
    Ok(())
}

pub fn handle_recipes(json: bool) -> Result<()> {
    let book = recipe_book()?;
    if json {
        return print_json(&book);
    }
    for row in book {
        println!(
            "{:<8} base {:<5} {:>2} bits  {}",
            row.name, row.base, row.bits_per_symbol, row.sample
        );
    }
    Ok(())
}
