// Free-text and diagram notes attached to suites and cases

use crate::report::model::ReportNotes;

/// Anything that can render itself as diagram text (e.g. a mermaid sequence diagram)
pub trait Diagram {
    fn generate(&self) -> String;
}

impl Diagram for str {
    fn generate(&self) -> String {
        self.to_string()
    }
}

impl Diagram for String {
    fn generate(&self) -> String {
        self.clone()
    }
}

/// Ordered text lines plus ordered rendered diagrams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    text: Vec<String>,
    diagrams: Vec<String>,
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, line: impl Into<String>) -> Self {
        self.add_text(line);
        self
    }

    pub fn with_diagram<D: Diagram + ?Sized>(mut self, diagram: &D) -> Self {
        self.add_diagram(diagram);
        self
    }

    pub fn add_text(&mut self, line: impl Into<String>) {
        self.text.push(line.into());
    }

    /// Diagrams are rendered at the point they are attached
    pub fn add_diagram<D: Diagram + ?Sized>(&mut self, diagram: &D) {
        self.diagrams.push(diagram.generate());
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub fn diagrams(&self) -> &[String] {
        &self.diagrams
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.diagrams.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.diagrams.clear();
    }

    /// `None` marks "nothing recorded", as opposed to an empty structure
    pub fn to_report(&self) -> Option<ReportNotes> {
        if self.is_empty() {
            return None;
        }
        Some(ReportNotes {
            notes: self.text.clone(),
            diagrams: self.diagrams.clone(),
        })
    }
}

impl From<ReportNotes> for Notes {
    fn from(notes: ReportNotes) -> Self {
        Self {
            text: notes.notes,
            diagrams: notes.diagrams,
        }
    }
}
