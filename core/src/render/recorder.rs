use crate::prelude::{DrawingSurface, LineCap, Point, Rgb, TextRun};

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Rgb),
    FillSector {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        color: Rgb,
    },
    StrokeSector {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
    },
    StrokeArc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
        cap: LineCap,
    },
    FillDisk {
        center: Point,
        radius: f64,
        color: Rgb,
    },
    Text(TextRun),
}

/// Surface that keeps every drawing call in order instead of rasterizing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn sectors(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillSector { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(run) => Some(run),
            _ => None,
        })
    }
}

impl DrawingSurface for RecordingSurface {
    fn fill_background(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::Background(color));
    }

    fn fill_sector(&mut self, center: Point, radius: f64, start: f64, end: f64, color: Rgb) {
        self.commands.push(DrawCommand::FillSector {
            center,
            radius,
            start,
            end,
            color,
        });
    }

    fn stroke_sector(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
    ) {
        self.commands.push(DrawCommand::StrokeSector {
            center,
            radius,
            start,
            end,
            width,
            color,
        });
    }

    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
        cap: LineCap,
    ) {
        self.commands.push(DrawCommand::StrokeArc {
            center,
            radius,
            start,
            end,
            width,
            color,
            cap,
        });
    }

    fn fill_disk(&mut self, center: Point, radius: f64, color: Rgb) {
        self.commands.push(DrawCommand::FillDisk {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, run: TextRun) {
        self.commands.push(DrawCommand::Text(run));
    }
}
