use anyhow::{anyhow, bail, ensure, Context, Result};
use ndarray::Array2;
use seisattr::kernel::KernelLifecycle;
use seisattr::num_rs::{ifft, rfft_full};
use seisattr::signal::attributes::{
    Attribute, AttributeConfig, AttributeKernel, InstantaneousAttributesConfig,
    InstantaneousAttributesKernel, TraceGridConfig, TraceGridKernel,
};
use seisattr::signal::gradient::time_derivative;
use seisattr::signal::hilbert::{hilbert_mask, HilbertConfig, HilbertKernel};
use seisattr::signal::traits::{
    AnalyticSignal1D, InstantaneousAttributes1D, SelectedAttributes1D, TraceGridAttributes,
};
use seisattr::signal::unwrap::unwrap;
use seisattr::Complex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::f64::consts::PI;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_PYTHON_BIN: &str = "python";
const SAMPLE_INTERVAL: f64 = 0.004;

const PY_REFERENCE_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import scipy
import scipy.signal

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _x():
    return np.asarray(p["x"], dtype=float)

def _complex():
    return np.asarray(p["re"], dtype=float) + 1j * np.asarray(p["im"], dtype=float)

def _split(z):
    z = np.asarray(z).reshape(-1)
    return np.concatenate([z.real, z.imag])

def _compute():
    if op == "fft":
        return _split(np.fft.fft(_x()))
    if op == "ifft":
        return _split(np.fft.ifft(_complex()))
    if op == "hilbert":
        return _split(scipy.signal.hilbert(_x()))
    if op == "angle":
        return np.angle(scipy.signal.hilbert(_x()))
    if op == "abs":
        return np.abs(scipy.signal.hilbert(_x()))
    if op == "imag":
        return np.imag(scipy.signal.hilbert(_x()))
    if op == "unwrap":
        return np.unwrap(_x())
    if op == "gradient":
        return np.gradient(_x(), float(p["dt"]))
    if op == "frequency":
        phase = np.unwrap(np.angle(scipy.signal.hilbert(_x())))
        return np.gradient(phase, float(p["dt"])) / (2.0 * np.pi)
    if op == "grid_envelope":
        grid = np.asarray(p["grid"], dtype=float)
        return np.abs(scipy.signal.hilbert(grid, axis=-1))

    raise RuntimeError(f"unsupported op: {op}")

y = np.asarray(_compute(), dtype=float).reshape(-1)

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__,
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    samples: usize,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    speedup_vs_baseline: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    tolerance: f64,
    rows: Vec<ContractRow>,
}

/// One contract case: a Rust candidate, a Rust baseline and a NumPy/SciPy
/// reference for the same input.
struct Case<'a> {
    id: &'a str,
    op: &'a str,
    payload: serde_json::Value,
    candidate: Vec<f64>,
    candidate_ns: f64,
    baseline: Vec<f64>,
    baseline_ns: f64,
}

/// Interpreter and library versions, captured from the first reference call.
#[derive(Debug, Clone)]
struct ReferenceVersions {
    python: String,
    numpy: String,
    scipy: String,
}

struct ContractRunner {
    python_bin: PathBuf,
    tolerance: f64,
    versions: Option<ReferenceVersions>,
    rows: Vec<ContractRow>,
    failures: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            eprintln!();
            eprintln!("Environment:");
            eprintln!("  SEISATTR_PYTHON   python interpreter with numpy + scipy (default: python)");
            eprintln!("  RUST_LOG          log filter, e.g. RUST_LOG=xtask=info,seisattr=debug");
            Ok(())
        }
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directory")?;

    let mut runner = ContractRunner {
        python_bin: detect_python_bin(),
        tolerance: 1e-9,
        versions: None,
        rows: Vec::new(),
        failures: Vec::new(),
    };
    tracing::info!(python = %runner.python_bin.display(), "running contracts");

    let even = synthetic_trace(512);
    let odd = synthetic_trace(511);

    // Forward transform
    {
        let candidate = split_complex(&rfft_full(&even).map_err(|e| anyhow!("fft failed: {e}"))?);
        let candidate_ns = mean_ns(200, || {
            rfft_full(&even)
                .map(|_| ())
                .map_err(|e| anyhow!("fft benchmark failed: {e}"))
        })?;
        let as_complex = to_complex(&even);
        let baseline = split_complex(&naive_dft(&as_complex, false));
        let baseline_ns = mean_ns(5, || {
            let _ = naive_dft(&as_complex, false);
            Ok(())
        })?;
        runner.record(Case {
            id: "fft_512_f64",
            op: "fft",
            payload: json!({ "x": even }),
            candidate,
            candidate_ns,
            baseline,
            baseline_ns,
        })?;
    }

    // Inverse transform
    {
        let spectrum = naive_dft(&to_complex(&odd), false);
        let candidate = split_complex(&ifft(&spectrum).map_err(|e| anyhow!("ifft failed: {e}"))?);
        let candidate_ns = mean_ns(200, || {
            ifft(&spectrum)
                .map(|_| ())
                .map_err(|e| anyhow!("ifft benchmark failed: {e}"))
        })?;
        let baseline = split_complex(&naive_dft(&spectrum, true));
        let baseline_ns = mean_ns(5, || {
            let _ = naive_dft(&spectrum, true);
            Ok(())
        })?;
        let (re, im): (Vec<f64>, Vec<f64>) = spectrum.iter().map(|c| (c.re, c.im)).unzip();
        runner.record(Case {
            id: "ifft_511_f64",
            op: "ifft",
            payload: json!({ "re": re, "im": im }),
            candidate,
            candidate_ns,
            baseline,
            baseline_ns,
        })?;
    }

    // Analytic signal, both mask parities
    let hilbert = HilbertKernel::try_new(HilbertConfig::default())?;
    for (id, x) in [("hilbert_512_f64", &even), ("hilbert_511_f64", &odd)] {
        let candidate: Vec<Complex<f64>> = hilbert
            .run_alloc(x.as_slice())
            .map_err(|e| anyhow!("{id} candidate execution failed: {e}"))?;
        let candidate_ns = mean_ns(200, || {
            AnalyticSignal1D::<f64>::run_alloc(&hilbert, x.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("{id} candidate benchmark failed: {e}"))
        })?;
        let baseline = naive_analytic(x);
        let baseline_ns = mean_ns(5, || {
            let _ = naive_analytic(x);
            Ok(())
        })?;
        runner.record(Case {
            id,
            op: "hilbert",
            payload: json!({ "x": x }),
            candidate: split_complex(&candidate),
            candidate_ns,
            baseline: split_complex(&baseline),
            baseline_ns,
        })?;
    }

    // Phase, envelope and Hilbert component
    {
        let kernel = InstantaneousAttributesKernel::try_new(InstantaneousAttributesConfig::default())?;
        let attrs = kernel
            .run_alloc(odd.as_slice())
            .map_err(|e| anyhow!("attribute candidate execution failed: {e}"))?;
        let candidate_ns = mean_ns(200, || {
            InstantaneousAttributes1D::<f64>::run_alloc(&kernel, odd.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("attribute candidate benchmark failed: {e}"))
        })?;
        let reference = naive_analytic(&odd);
        let baseline_ns = mean_ns(5, || {
            let _ = naive_analytic(&odd);
            Ok(())
        })?;
        let outputs = [
            ("phase_511_f64", "angle", attrs.phase, reference.iter().map(|c| c.arg()).collect::<Vec<_>>()),
            ("envelope_511_f64", "abs", attrs.envelope, reference.iter().map(|c| c.norm()).collect::<Vec<_>>()),
            ("quadrature_511_f64", "imag", attrs.hilbert, reference.iter().map(|c| c.im).collect::<Vec<_>>()),
        ];
        for (id, op, candidate, baseline) in outputs {
            runner.record(Case {
                id,
                op,
                payload: json!({ "x": odd }),
                candidate,
                candidate_ns,
                baseline,
                baseline_ns,
            })?;
        }
    }

    // Phase unwrapping
    {
        let wrapped = (0..400)
            .map(|i| {
                let p = 0.37 * i as f64 + 0.5 * (i as f64 / 11.0).sin();
                (p + PI).rem_euclid(2.0 * PI) - PI
            })
            .collect::<Vec<_>>();
        let candidate = unwrap(&wrapped);
        let candidate_ns = mean_ns(500, || {
            let _ = unwrap(&wrapped);
            Ok(())
        })?;
        let baseline = naive_unwrap(&wrapped);
        let baseline_ns = mean_ns(500, || {
            let _ = naive_unwrap(&wrapped);
            Ok(())
        })?;
        runner.record(Case {
            id: "unwrap_400_f64",
            op: "unwrap",
            payload: json!({ "x": wrapped }),
            candidate,
            candidate_ns,
            baseline,
            baseline_ns,
        })?;
    }

    // Sample-axis derivative
    {
        let candidate = time_derivative(&even, SAMPLE_INTERVAL)
            .map_err(|e| anyhow!("gradient failed: {e}"))?;
        let candidate_ns = mean_ns(500, || {
            time_derivative(&even, SAMPLE_INTERVAL)
                .map(|_| ())
                .map_err(|e| anyhow!("gradient benchmark failed: {e}"))
        })?;
        let baseline = naive_gradient(&even, SAMPLE_INTERVAL);
        let baseline_ns = mean_ns(500, || {
            let _ = naive_gradient(&even, SAMPLE_INTERVAL);
            Ok(())
        })?;
        runner.record(Case {
            id: "gradient_512_f64",
            op: "gradient",
            payload: json!({ "x": even, "dt": SAMPLE_INTERVAL }),
            candidate,
            candidate_ns,
            baseline,
            baseline_ns,
        })?;
    }

    // Instantaneous frequency
    {
        let kernel = AttributeKernel::try_new(AttributeConfig {
            attributes: vec![Attribute::Frequency],
            sample_interval: SAMPLE_INTERVAL,
            parallel: false,
        })?;
        let candidate = SelectedAttributes1D::run_alloc(&kernel, even.as_slice())
            .map_err(|e| anyhow!("frequency candidate execution failed: {e}"))?
            .into_iter()
            .next()
            .context("frequency candidate returned no output")?;
        let candidate_ns = mean_ns(200, || {
            SelectedAttributes1D::run_alloc(&kernel, even.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("frequency candidate benchmark failed: {e}"))
        })?;
        let baseline_fn = || {
            let phase = naive_analytic(&even).iter().map(|c| c.arg()).collect::<Vec<_>>();
            naive_gradient(&naive_unwrap(&phase), SAMPLE_INTERVAL)
                .into_iter()
                .map(|v| v / (2.0 * PI))
                .collect::<Vec<_>>()
        };
        let baseline = baseline_fn();
        let baseline_ns = mean_ns(5, || {
            let _ = baseline_fn();
            Ok(())
        })?;
        runner.record(Case {
            id: "frequency_512_f64",
            op: "frequency",
            payload: json!({ "x": even, "dt": SAMPLE_INTERVAL }),
            candidate,
            candidate_ns,
            baseline,
            baseline_ns,
        })?;
    }

    // Trace grid: parallel candidate against the sequential driver
    {
        let grid = Array2::from_shape_fn((48, 300), |(trace, sample)| {
            let t = sample as f64 * SAMPLE_INTERVAL + trace as f64 * 0.002;
            (2.0 * PI * 18.0 * t).sin() * (-(t - 0.6).powi(2) * 20.0).exp()
        });
        let parallel = TraceGridKernel::try_new(TraceGridConfig { parallel: true })?;
        let sequential = TraceGridKernel::try_new(TraceGridConfig { parallel: false })?;
        let candidate = TraceGridAttributes::<f64>::run_alloc(&parallel, &grid)
            .map_err(|e| anyhow!("grid candidate execution failed: {e}"))?;
        let candidate_ns = mean_ns(40, || {
            TraceGridAttributes::<f64>::run_alloc(&parallel, &grid)
                .map(|_| ())
                .map_err(|e| anyhow!("grid candidate benchmark failed: {e}"))
        })?;
        let baseline = TraceGridAttributes::<f64>::run_alloc(&sequential, &grid)
            .map_err(|e| anyhow!("grid baseline execution failed: {e}"))?;
        let baseline_ns = mean_ns(40, || {
            TraceGridAttributes::<f64>::run_alloc(&sequential, &grid)
                .map(|_| ())
                .map_err(|e| anyhow!("grid baseline benchmark failed: {e}"))
        })?;
        let rows = grid.rows().into_iter().map(|r| r.to_vec()).collect::<Vec<_>>();
        runner.record(Case {
            id: "grid_envelope_48x300_f64",
            op: "grid_envelope",
            payload: json!({ "grid": rows }),
            candidate: candidate.envelope.iter().copied().collect(),
            candidate_ns,
            baseline: baseline.envelope.iter().copied().collect(),
            baseline_ns,
        })?;
    }

    let versions = runner
        .versions
        .take()
        .context("no contract case reached the python reference")?;
    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: runner.python_bin.to_string_lossy().into_owned(),
        python_version: versions.python,
        numpy_version: versions.numpy,
        scipy_version: versions.scipy,
        tolerance: runner.tolerance,
        rows: runner.rows,
    };

    let csv: String = std::iter::once(CSV_HEADER.to_string())
        .chain(bundle.rows.iter().map(ContractRow::csv_line))
        .collect();
    fs::write(out_dir.join("summary.csv"), csv).context("writing summary.csv")?;
    fs::write(
        out_dir.join("summary.json"),
        serde_json::to_vec_pretty(&bundle).context("serializing summary bundle")?,
    )
    .context("writing summary.json")?;

    println!("Contract artifacts generated in: {}", out_dir.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - {}", out_dir.join("summary.json").display());
    println!("  - cases: {}", bundle.rows.len());

    if !runner.failures.is_empty() {
        bail!(
            "{} contract case(s) exceeded max-abs tolerance {:e}: {}",
            runner.failures.len(),
            bundle.tolerance,
            runner.failures.join(", ")
        );
    }
    Ok(())
}

impl ContractRunner {
    fn record(&mut self, case: Case<'_>) -> Result<()> {
        let py = python_reference_eval(&self.python_bin, case.op, case.payload, 50)?;
        if self.versions.is_none() {
            tracing::info!(
                python = %py.python_version,
                numpy = %py.numpy_version,
                "reference interpreter"
            );
            self.versions = Some(ReferenceVersions {
                python: py.python_version.clone(),
                numpy: py.numpy_version.clone(),
                scipy: py.scipy_version.clone().unwrap_or_else(|| "unknown".to_string()),
            });
        }
        ensure!(
            case.candidate.len() == case.baseline.len() && case.candidate.len() == py.output.len(),
            "case {} has mismatched output lengths: candidate={}, baseline={}, python={}",
            case.id,
            case.candidate.len(),
            case.baseline.len(),
            py.output.len()
        );

        let against_python = Metrics::compare(&case.candidate, &py.output);
        let against_baseline = Metrics::compare(&case.candidate, &case.baseline);
        let row = ContractRow {
            case_id: case.id.to_string(),
            samples: case.candidate.len(),
            mae: against_python.mae,
            rmse: against_python.rmse,
            max_abs: against_python.max_abs,
            rust_candidate_ns: case.candidate_ns,
            rust_baseline_ns: case.baseline_ns,
            python_ns: py.avg_ns,
            speedup_vs_baseline: case.baseline_ns / case.candidate_ns,
            speedup_vs_python: py.avg_ns / case.candidate_ns,
        };
        tracing::info!(
            case = case.id,
            max_abs = row.max_abs,
            baseline_max_abs = against_baseline.max_abs,
            speedup_vs_python = row.speedup_vs_python,
            "contract case recorded"
        );
        if row.max_abs > self.tolerance {
            tracing::warn!(case = case.id, max_abs = row.max_abs, "tolerance exceeded");
            self.failures.push(case.id.to_string());
        }
        self.rows.push(row);
        Ok(())
    }
}

struct Metrics {
    mae: f64,
    rmse: f64,
    max_abs: f64,
}

impl Metrics {
    fn compare(a: &[f64], b: &[f64]) -> Self {
        let n = a.len().max(1) as f64;
        let (abs_sum, sq_sum, max_abs) =
            a.iter()
                .zip(b.iter())
                .fold((0.0, 0.0, 0.0f64), |(abs_sum, sq_sum, max_abs), (x, y)| {
                    let d = (x - y).abs();
                    (abs_sum + d, sq_sum + d * d, max_abs.max(d))
                });
        Self {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            max_abs,
        }
    }
}

/// Deterministic broadband trace with both positive and negative lobes.
fn synthetic_trace(samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| {
            let x = i as f64 / 27.0;
            x.sin() + 0.35 * (2.3 * x).cos() + 0.1 * (7.0 * x).sin()
        })
        .collect()
}

fn to_complex(x: &[f64]) -> Vec<Complex<f64>> {
    x.iter().map(|v| Complex::new(*v, 0.0)).collect()
}

fn split_complex(z: &[Complex<f64>]) -> Vec<f64> {
    z.iter().map(|c| c.re).chain(z.iter().map(|c| c.im)).collect()
}

/// Direct `O(N^2)` evaluation of the DFT definition.
fn naive_dft(x: &[Complex<f64>], inverse: bool) -> Vec<Complex<f64>> {
    let n = x.len();
    let sign = if inverse { 1.0 } else { -1.0 };
    let scale = if inverse { 1.0 / n as f64 } else { 1.0 };
    (0..n)
        .map(|k| {
            x.iter().enumerate().fold(Complex::new(0.0, 0.0), |acc, (j, v)| {
                let angle = sign * 2.0 * PI * ((k * j) % n) as f64 / n as f64;
                acc + *v * Complex::from_polar(1.0, angle)
            }) * scale
        })
        .collect()
}

fn naive_analytic(x: &[f64]) -> Vec<Complex<f64>> {
    let masked = naive_dft(&to_complex(x), false)
        .into_iter()
        .zip(hilbert_mask::<f64>(x.len()))
        .map(|(c, h)| c * h)
        .collect::<Vec<_>>();
    naive_dft(&masked, true)
}

fn naive_unwrap(p: &[f64]) -> Vec<f64> {
    let mut out = p.to_vec();
    let mut correction = 0.0;
    for i in 1..p.len() {
        let dd = p[i] - p[i - 1];
        let mut ddmod = (dd + PI).rem_euclid(2.0 * PI) - PI;
        if ddmod == -PI && dd > 0.0 {
            ddmod = PI;
        }
        if dd.abs() >= PI {
            correction += ddmod - dd;
        }
        out[i] += correction;
    }
    out
}

fn naive_gradient(x: &[f64], dt: f64) -> Vec<f64> {
    let n = x.len();
    (0..n)
        .map(|i| match i {
            _ if n < 2 => 0.0,
            0 => (x[1] - x[0]) / dt,
            _ if i == n - 1 => (x[n - 1] - x[n - 2]) / dt,
            _ => (x[i + 1] - x[i - 1]) / (2.0 * dt),
        })
        .collect()
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("SEISATTR_PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_reference_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_REFERENCE_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let request = serde_json::to_vec(&payload).context("encoding reference request")?;
    let mut child = Command::new(python_bin)
        .args(["-c", script])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("starting {}", python_bin.display()))?;

    // Dropping stdin closes the pipe so the script sees EOF.
    child
        .stdin
        .take()
        .context("reference stdin unavailable")?
        .write_all(&request)
        .context("sending reference request")?;

    let output = child.wait_with_output().context("waiting for reference")?;
    ensure!(
        output.status.success(),
        "reference script failed ({}): {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    serde_json::from_slice(&output.stdout).context("decoding reference response")
}

/// Mean wall time of `f` over `iters` calls, in nanoseconds.
fn mean_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let iters = iters.max(1);
    let start = Instant::now();
    (0..iters).try_for_each(|_| f())?;
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

const CSV_HEADER: &str = "case_id,samples,mae,rmse,max_abs,rust_candidate_ns,rust_baseline_ns,python_ns,speedup_vs_baseline,speedup_vs_python\n";

impl ContractRow {
    fn csv_line(&self) -> String {
        format!(
            "{},{},{:.3e},{:.3e},{:.3e},{:.3},{:.3},{:.3},{:.6},{:.6}\n",
            self.case_id,
            self.samples,
            self.mae,
            self.rmse,
            self.max_abs,
            self.rust_candidate_ns,
            self.rust_baseline_ns,
            self.python_ns,
            self.speedup_vs_baseline,
            self.speedup_vs_python,
        )
    }
}
