use crate::{
    core::geo::{ScreenPoint, ScreenRect, TileCoord},
    overlays::base::Rank,
};

/// Commands queued by the surface and its overlays for the host renderer
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Basemap tiles, always drawn first
    Basemap {
        tile_source: String,
        zoom: f64,
        tiles: Vec<TileCoord>,
    },
    /// Current-location fix
    Location {
        rank: Rank,
        position: ScreenPoint,
        heading: Option<f64>,
    },
    Compass {
        rank: Rank,
        center: ScreenPoint,
        /// Needle bearing relative to the rotated map
        bearing: f64,
    },
    MiniMap {
        rank: Rank,
        rect: ScreenRect,
        zoom: f64,
    },
    Text {
        rank: Rank,
        position: ScreenPoint,
        text: String,
    },
    Line {
        rank: Rank,
        points: Vec<ScreenPoint>,
    },
    Marker {
        rank: Rank,
        icon: ScreenRect,
        title: String,
    },
}

impl DrawCommand {
    /// Rank of the overlay that queued the command; `None` for the basemap
    pub fn rank(&self) -> Option<Rank> {
        match self {
            DrawCommand::Basemap { .. } => None,
            DrawCommand::Location { rank, .. }
            | DrawCommand::Compass { rank, .. }
            | DrawCommand::MiniMap { rank, .. }
            | DrawCommand::Text { rank, .. }
            | DrawCommand::Line { rank, .. }
            | DrawCommand::Marker { rank, .. } => Some(*rank),
        }
    }
}

/// Drawing queue for one frame
#[derive(Debug, Default)]
pub struct RenderContext {
    pub width: f64,
    pub height: f64,
    drawing_queue: Vec<DrawCommand>,
    frame: u64,
}

impl RenderContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            frame: 0,
        }
    }

    /// Begin a frame, dropping whatever the previous one queued
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.frame += 1;
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.drawing_queue.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Overlay ranks in the order they were painted, one entry per command
    pub fn painted_ranks(&self) -> Vec<Rank> {
        self.drawing_queue.iter().filter_map(DrawCommand::rank).collect()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn clear_queue(&mut self) {
        self.drawing_queue.clear();
    }
}
