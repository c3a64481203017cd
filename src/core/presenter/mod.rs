//! # Presenter Module
//!
//! The review-and-delete collaborator. The curator only produces ordered
//! path lists; the presenter owns rendering and deletion, and the curator
//! never observes what was removed.

use crate::error::PresentError;
use console::style;
use dialoguer::{Confirm, MultiSelect};
use std::fs;
use std::path::PathBuf;

/// Receives an ordered path list for manual review.
pub trait ReviewPresenter {
    /// Present `paths` for review, `display_batch` at a time.
    fn review(&mut self, paths: &[PathBuf], display_batch: usize)
        -> Result<(), PresentError>;
}

/// Interactive terminal presenter: pages through the list, lets the user
/// mark files, confirms, then deletes the marked files.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn new() -> Self {
        Self
    }

    fn delete(&self, path: &PathBuf) -> Result<(), PresentError> {
        fs::remove_file(path).map_err(|source| PresentError::Remove {
            path: path.clone(),
            source,
        })
    }
}

impl ReviewPresenter for ConsolePresenter {
    fn review(
        &mut self,
        paths: &[PathBuf],
        display_batch: usize,
    ) -> Result<(), PresentError> {
        if paths.is_empty() {
            println!("{}", style("Nothing to review.").dim());
            return Ok(());
        }

        let pages = paths.chunks(display_batch.max(1)).collect::<Vec<_>>();
        let total_pages = pages.len();

        for (page_index, page) in pages.into_iter().enumerate() {
            println!(
                "{} {}/{}",
                style("Review page").bold().cyan(),
                page_index + 1,
                total_pages
            );

            let labels: Vec<String> = page.iter().map(|p| p.display().to_string()).collect();
            let marked = MultiSelect::new()
                .with_prompt("Mark files to delete (space to mark, enter to continue)")
                .items(&labels)
                .interact()
                .map_err(|e| PresentError::Prompt(e.to_string()))?;

            if !marked.is_empty() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete {} file(s)?", marked.len()))
                    .default(false)
                    .interact()
                    .map_err(|e| PresentError::Prompt(e.to_string()))?;

                if confirmed {
                    for index in marked {
                        self.delete(&page[index])?;
                    }
                }
            }

            if page_index + 1 < total_pages {
                let keep_going = Confirm::new()
                    .with_prompt("Continue to the next page?")
                    .default(true)
                    .interact()
                    .map_err(|e| PresentError::Prompt(e.to_string()))?;
                if !keep_going {
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what it was asked to present.
    #[derive(Debug, Default)]
    struct RecordingPresenter {
        calls: Vec<(Vec<PathBuf>, usize)>,
    }

    impl ReviewPresenter for RecordingPresenter {
        fn review(
            &mut self,
            paths: &[PathBuf],
            display_batch: usize,
        ) -> Result<(), PresentError> {
            self.calls.push((paths.to_vec(), display_batch));
            Ok(())
        }
    }

    #[test]
    fn recording_presenter_captures_calls() {
        let mut presenter = RecordingPresenter::default();
        let paths = vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")];

        presenter.review(&paths, 2).unwrap();

        assert_eq!(presenter.calls.len(), 1);
        assert_eq!(presenter.calls[0].0, paths);
        assert_eq!(presenter.calls[0].1, 2);
    }

    #[test]
    fn trait_is_object_safe() {
        let mut presenter = RecordingPresenter::default();
        let dyn_presenter: &mut dyn ReviewPresenter = &mut presenter;
        dyn_presenter.review(&[], 2).unwrap();
    }
}
