//! Lane scheduling and collision avoidance for danmaku caption overlays
//!
//! `danmaku-engine` decides, tick by tick, where each timed caption appears on
//! top of a playing video: which lane a scrolling caption takes, what path it
//! follows, how fast, and when it is retired. It never paints anything; each
//! tick returns [`PlacementEvent`]s for the presentation layer to render.
//!
//! ```rust
//! use danmaku_engine::{
//!     EngineConfig, ManualClock, MonospaceMeasure, OverlayEngine, PlacementAction, Tick, Viewport,
//! };
//!
//! let clock = ManualClock::new();
//! let mut engine =
//!     OverlayEngine::new(EngineConfig::default(), MonospaceMeasure::default(), clock.clone())?;
//! engine.load("[Events]\nDialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,hello")?;
//!
//! let viewport = Viewport::new(1280.0, 720.0);
//! let events = engine.advance(Tick::new(1.5, viewport, 1.0))?;
//! assert_eq!(events[0].action, PlacementAction::Enter);
//! assert_eq!(events[0].x, 1280.0);
//!
//! clock.advance_ms(1000.0);
//! let events = engine.advance(Tick::new(2.5, viewport, 1.0))?;
//! assert_eq!(events[0].action, PlacementAction::Update);
//! assert!(events[0].x < 1280.0);
//! # Ok::<(), danmaku_engine::EngineError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod collision;
pub mod config;
pub mod engine;
pub mod lanes;
pub mod layout;
pub mod lifecycle;
pub mod measure;
pub mod placement;
pub mod utils;

pub use clock::{AnimationClock, ManualClock, MediaClock, SystemClock, WallClock};
pub use collision::BoundingBox;
pub use config::EngineConfig;
pub use engine::{OverlayEngine, Tick};
pub use lanes::{LaneAllocator, LaneAssignment, LaneGeometry};
pub use layout::{Trajectory, Viewport};
pub use lifecycle::LifecycleManager;
pub use measure::{MonospaceMeasure, TextMeasure};
pub use placement::{ActivePlacement, PlacementAction, PlacementEvent};
pub use utils::EngineError;

/// Re-export the cue model from danmaku-core
pub use danmaku_core::{Cue, CueId, CueSet, ParseError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
