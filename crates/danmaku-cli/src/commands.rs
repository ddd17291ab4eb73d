//! Subcommand implementations

use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use danmaku_core::{classify, format_ass_time, CueSet, Motion, ParseIssue};
use danmaku_engine::{
    EngineConfig, ManualClock, MonospaceMeasure, OverlayEngine, PlacementAction, PlacementEvent,
    Tick, Viewport,
};
use serde::Serialize;

/// Extra media time simulated after the last cue ends
const TAIL_SECS: f64 = 1.0;

/// Parameters of a simulated playback
#[derive(Debug, Clone, PartialEq)]
pub struct SimulateOptions {
    pub width: f32,
    pub height: f32,
    pub rate: f64,
    pub step_ms: f64,
    pub from: f64,
    pub until: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CueSummary {
    id: usize,
    start: f64,
    end: f64,
    motion: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    cues: Vec<CueSummary>,
    issues: &'a [ParseIssue],
}

#[derive(Debug, Serialize)]
struct FrameEvent<'a> {
    time: f64,
    #[serde(flatten)]
    event: &'a PlacementEvent,
}

/// Totals reported once a simulation finishes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSummary {
    pub frames: usize,
    pub enters: usize,
    pub exits: usize,
}

fn read_source(input: &Path) -> Result<String> {
    std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read subtitle file {}", input.display()))
}

/// Print the cues and skipped lines of a subtitle file
pub fn inspect(input: &Path, json: bool) -> Result<()> {
    let source = read_source(input)?;
    let cues = CueSet::parse(&source).context("Failed to parse subtitle file")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_inspect(&cues, json, &mut out)
}

fn write_inspect<W: Write>(cues: &CueSet, json: bool, out: &mut W) -> Result<()> {
    let summaries: Vec<CueSummary> = cues
        .iter()
        .map(|cue| CueSummary {
            id: cue.id.0,
            start: cue.start,
            end: cue.end,
            motion: match classify(cue) {
                Motion::Scrolling => "scrolling",
                Motion::Explicit(_) => "explicit",
            },
            text: cue.display_text(),
        })
        .collect();

    if json {
        let report = InspectReport {
            cues: summaries,
            issues: cues.issues(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    for cue in &summaries {
        writeln!(
            out,
            "cue-{:<5} {} -> {}  {:<9} {}",
            cue.id,
            format_ass_time(cue.start),
            format_ass_time(cue.end),
            cue.motion,
            cue.text.replace('\n', " / ")
        )?;
    }
    for issue in cues.issues() {
        writeln!(out, "{issue}")?;
    }
    writeln!(
        out,
        "{} cues, {} skipped lines",
        summaries.len(),
        cues.issues().len()
    )?;
    Ok(())
}

/// Replay a subtitle file against a synthetic player clock
pub fn simulate(input: &Path, config: EngineConfig, options: &SimulateOptions) -> Result<()> {
    let source = read_source(input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_simulation(&source, config, options, &mut out)?;
    tracing::info!(
        frames = summary.frames,
        enters = summary.enters,
        exits = summary.exits,
        "simulation finished"
    );
    Ok(())
}

/// Play `source` forward from `options.from`, writing one JSON object per
/// placement event.
///
/// Each frame advances the wall clock by `step_ms` and media time by
/// `step_ms * rate`. Placements still active at the end are cleared so every
/// `enter` is matched by an `exit`.
pub fn run_simulation<W: Write>(
    source: &str,
    config: EngineConfig,
    options: &SimulateOptions,
    out: &mut W,
) -> Result<SimulationSummary> {
    if !(options.step_ms.is_finite() && options.step_ms > 0.0) {
        bail!("step must be a positive number of milliseconds");
    }

    let clock = ManualClock::new();
    let mut engine = OverlayEngine::new(config, MonospaceMeasure::default(), clock.clone())?;
    engine
        .load(source)
        .context("Failed to load captions")?;

    let grace = engine.config().grace_secs;
    let until = options.until.unwrap_or_else(|| {
        engine
            .cues()
            .iter()
            .map(|cue| cue.end)
            .fold(options.from, f64::max)
            + grace
            + TAIL_SECS
    });
    let viewport = Viewport::new(options.width, options.height);

    let mut summary = SimulationSummary::default();
    let mut frame: u32 = 0;
    let mut time = options.from;
    while time <= until {
        let events = engine.advance(Tick::new(time, viewport, options.rate))?;
        write_events(out, time, &events, &mut summary)?;
        summary.frames += 1;

        frame += 1;
        clock.set_ms(f64::from(frame) * options.step_ms);
        time = options.from + f64::from(frame) * options.step_ms / 1000.0 * options.rate;
    }

    let events = engine.clear();
    write_events(out, time, &events, &mut summary)?;
    Ok(summary)
}

fn write_events<W: Write>(
    out: &mut W,
    time: f64,
    events: &[PlacementEvent],
    summary: &mut SimulationSummary,
) -> Result<()> {
    for event in events {
        match event.action {
            PlacementAction::Enter => summary.enters += 1,
            PlacementAction::Exit => summary.exits += 1,
            PlacementAction::Update => {}
        }
        serde_json::to_writer(&mut *out, &FrameEvent { time, event })?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "[Events]\n\
        Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,Hello\\, world\n\
        Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,{\\move(10,10,100,10)}sign\n\
        Dialogue: broken line\n";

    fn options() -> SimulateOptions {
        SimulateOptions {
            width: 800.0,
            height: 450.0,
            rate: 1.0,
            step_ms: 250.0,
            from: 0.0,
            until: None,
        }
    }

    #[test]
    fn inspect_lists_cues_and_issues() {
        let cues = CueSet::parse(SCRIPT).unwrap();
        let mut out = Vec::new();
        write_inspect(&cues, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("scrolling"));
        assert!(lines[0].contains("Hello, world"));
        assert!(lines[1].contains("explicit"));
        assert_eq!(lines[3], "2 cues, 1 skipped lines");
    }

    #[test]
    fn inspect_json_is_well_formed() {
        let cues = CueSet::parse(SCRIPT).unwrap();
        let mut out = Vec::new();
        write_inspect(&cues, true, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["cues"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["cues"][1]["text"], "sign");
        assert_eq!(value["issues"][0]["line"], 4);
    }

    #[test]
    fn simulation_pairs_enters_with_exits() {
        let mut out = Vec::new();
        let summary =
            run_simulation(SCRIPT, EngineConfig::default(), &options(), &mut out).unwrap();
        assert_eq!(summary.enters, 2);
        assert_eq!(summary.exits, 2);

        let text = String::from_utf8(out).unwrap();
        let first: serde_json::Value =
            serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["time"], 1.0);
        assert_eq!(first["action"], "enter");
        assert_eq!(first["cue_id"], 0);
        assert_eq!(first["x"], 800.0);
        assert_eq!(first["lane"], 0);
    }

    #[test]
    fn simulation_clears_placements_at_end() {
        let mut out = Vec::new();
        let options = SimulateOptions {
            until: Some(2.0),
            ..options()
        };
        let summary = run_simulation(SCRIPT, EngineConfig::default(), &options, &mut out).unwrap();
        assert_eq!(summary.frames, 9);
        assert_eq!(summary.exits, 2);
    }

    #[test]
    fn unusable_input_is_an_error() {
        let mut out = Vec::new();
        let result = run_simulation("no sections", EngineConfig::default(), &options(), &mut out);
        assert!(result.is_err());

        let bad_step = SimulateOptions {
            step_ms: 0.0,
            ..options()
        };
        assert!(run_simulation(SCRIPT, EngineConfig::default(), &bad_step, &mut out).is_err());
    }
}
