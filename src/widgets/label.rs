//! A single line of static text.

use pad::PadStr;

use crate::{
    Result,
    geom::{Point, Size},
    render::Draw,
    style::Color,
    tree::{Tree, ViewId, ViewState, Widget},
};

pub struct Label {
    text: String,
    color: Option<Color>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Label {
        Label {
            text: text.into(),
            color: None,
        }
    }

    pub fn with_color(text: impl Into<String>, color: Color) -> Label {
        Label {
            text: text.into(),
            color: Some(color),
        }
    }

    /// Create a label node sized to its text.
    pub fn create(tree: &mut Tree, text: impl Into<String>) -> ViewId {
        let label = Label::new(text);
        let size = Size::new(label.text.chars().count() as i32, 1);
        let id = tree.new_view(Box::new(label));
        tree.state_mut(id).set_size(size);
        id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for Label {
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        let color = self.color.unwrap_or(d.palette.normal);
        // Padded to the node width so a shorter replacement text overwrites
        // the old one.
        let w = view.size().x.max(0) as usize;
        d.text(color, Point::zero(), &self.text.pad_to_width(w))
    }

    fn size_intrinsic(&mut self, _target: Size) -> Size {
        Size::new(self.text.chars().count() as i32, 1)
    }
}
