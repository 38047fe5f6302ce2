//! A single commit rendered as a card: abbreviated id, author, and the
//! summary wrapped to the card width.

use pad::PadStr;
use textwrap::wrap;

use crate::{
    Result,
    geom::{Point, Size},
    git::Commit,
    render::Draw,
    style::{Attr, Color},
    tree::{ViewState, Widget},
};

/// How a commit card participates in the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    /// The card the user picked.
    Selected,
    /// A card showing the same commit somewhere else on screen.
    Similar,
    /// A card staged as a pending copy.
    Copy,
}

pub struct CommitPanel {
    commit: Commit,
    selection: Selection,
}

impl CommitPanel {
    pub fn new(commit: Commit) -> CommitPanel {
        CommitPanel {
            commit,
            selection: Selection::None,
        }
    }

    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    pub fn set_commit(&mut self, commit: Commit) {
        self.commit = commit;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Callers taint the node themselves; the panel has no tree access here.
    pub fn set_selection(&mut self, s: Selection) {
        self.selection = s;
    }

    fn highlight(&self, d: &Draw) -> Option<Color> {
        match self.selection {
            Selection::None => None,
            Selection::Selected => Some(d.palette.selection),
            Selection::Similar => Some(d.palette.selection_similar),
            Selection::Copy => Some(d.palette.selection_copy),
        }
    }

    fn body_lines(&self, width: i32) -> Vec<String> {
        wrap(&self.commit.summary, width.max(1) as usize)
            .iter()
            .map(|l| l.to_string())
            .collect()
    }
}

impl Widget for CommitPanel {
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        let w = view.size().x.max(0) as usize;
        let highlight = self.highlight(d);
        let header = format!(
            "{} {}",
            self.commit.id.short(),
            self.commit.author.name
        );
        {
            let mut hd = d.attr(Attr::Bold)?;
            let color = highlight.unwrap_or(hd.palette.dimmed);
            hd.text(color, Point::zero(), &header.pad_to_width(w))?;
        }
        let body = highlight.unwrap_or(d.palette.normal);
        for (i, line) in self.body_lines(view.size().x).iter().enumerate() {
            d.text(body, Point::new(0, 1 + i as i32), &line.pad_to_width(w))?;
        }
        Ok(())
    }

    fn size_intrinsic(&mut self, target: Size) -> Size {
        let body = self.body_lines(target.x).len() as i32;
        Size::new(target.x, 1 + body)
    }
}
