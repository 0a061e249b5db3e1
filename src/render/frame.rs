use crate::core::{PixelRect, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    ArcPrimitive, CirclePrimitive, Color, LinePrimitive, PathPrimitive, RectPrimitive,
    TextPrimitive,
};

/// One drawable item. Backends draw items in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line(LinePrimitive),
    Rect(RectPrimitive),
    Text(TextPrimitive),
    Arc(ArcPrimitive),
    Circle(CirclePrimitive),
    Path(PathPrimitive),
    /// Restricts following commands to the rectangle until `ResetClip`.
    Clip(PixelRect),
    ResetClip,
}

impl DrawCommand {
    fn validate(&self) -> ChartResult<()> {
        match self {
            DrawCommand::Line(line) => line.validate(),
            DrawCommand::Rect(rect) => rect.validate(),
            DrawCommand::Text(text) => text.validate(),
            DrawCommand::Arc(arc) => arc.validate(),
            DrawCommand::Circle(circle) => circle.validate(),
            DrawCommand::Path(path) => path.validate(),
            DrawCommand::Clip(rect) => {
                if [rect.left, rect.top, rect.width, rect.height]
                    .iter()
                    .all(|value| value.is_finite())
                {
                    Ok(())
                } else {
                    Err(ChartError::InvalidData(
                        "clip rectangle must be finite".to_owned(),
                    ))
                }
            }
            DrawCommand::ResetClip => Ok(()),
        }
    }
}

/// Backend-agnostic scene for one animation frame.
///
/// Unlike a flat list per primitive kind, commands keep their paint order:
/// chart types rely on later segments overdrawing earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub background: Option<Color>,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: None,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn line(&mut self, line: LinePrimitive) {
        self.commands.push(DrawCommand::Line(line));
    }

    pub fn rect(&mut self, rect: RectPrimitive) {
        self.commands.push(DrawCommand::Rect(rect));
    }

    pub fn text(&mut self, text: TextPrimitive) {
        self.commands.push(DrawCommand::Text(text));
    }

    pub fn arc(&mut self, arc: ArcPrimitive) {
        self.commands.push(DrawCommand::Arc(arc));
    }

    pub fn circle(&mut self, circle: CirclePrimitive) {
        self.commands.push(DrawCommand::Circle(circle));
    }

    pub fn path(&mut self, path: PathPrimitive) {
        if !path.is_empty() {
            self.commands.push(DrawCommand::Path(path));
        }
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.commands.extend(commands);
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if let Some(color) = self.background {
            color.validate()?;
        }
        for command in &self.commands {
            command.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&TextPrimitive> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn arcs(&self) -> Vec<&ArcPrimitive> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Arc(arc) => Some(arc),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn rects(&self) -> Vec<&RectPrimitive> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Rect(rect) => Some(rect),
                _ => None,
            })
            .collect()
    }
}
