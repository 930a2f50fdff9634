//! Line-oriented terminal driver over the search controller and watchlist.

pub mod render;

use std::io::Write;

use tokio::task::JoinHandle;

use crate::{
    db::watchlist::WatchlistStore,
    error::{AppError, AppResult},
    models::MovieDetail,
    services::{DetailState, QueryController, ReviewSession, SearchEvent, SubmitOutcome},
};

pub use render::{render_detail, render_results, render_watched, NoPanel, ReviewPanel};

const SEPARATOR_WIDTH: usize = 40;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Clear,
    Next,
    Prev,
    Refresh,
    /// 1-based index into the current page
    Open(usize),
    Watch(Option<usize>),
    Unwatch,
    Rate(u8),
    Review(String),
    Submit,
    /// List watched movies, or reopen one by its 1-based position
    Watched(Option<usize>),
    Help,
    Quit,
}

impl Command {
    /// Parse a line; anything not starting with `/` is a search query
    pub fn parse(line: &str) -> AppResult<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Search(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "search" | "s" => Command::Search(arg.to_string()),
            "clear" => Command::Clear,
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "refresh" | "r" => Command::Refresh,
            "open" | "o" => Command::Open(parse_index(arg)?),
            "watch" => Command::Watch(parse_optional_index(arg)?),
            "unwatch" => Command::Unwatch,
            "rate" => Command::Rate(arg.parse().map_err(|_| {
                AppError::InvalidInput(format!("Rating must be a number from 1 to 5, got '{arg}'"))
            })?),
            "review" => Command::Review(arg.to_string()),
            "submit" => Command::Submit,
            "watched" | "w" => Command::Watched(parse_optional_index(arg)?),
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unknown command '/{other}', try /help"
                )))
            }
        };

        Ok(command)
    }
}

fn parse_index(arg: &str) -> AppResult<usize> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::InvalidInput(format!(
            "Expected a result number, got '{arg}'"
        ))),
    }
}

fn parse_optional_index(arg: &str) -> AppResult<Option<usize>> {
    if arg.is_empty() {
        Ok(None)
    } else {
        parse_index(arg).map(Some)
    }
}

/// Interactive session state
pub struct Shell<W: Write> {
    controller: QueryController,
    watchlist: WatchlistStore,
    session: Option<ReviewSession>,
    pending_fetch: Option<JoinHandle<()>>,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(controller: QueryController, watchlist: WatchlistStore, out: W) -> Self {
        Self {
            controller,
            watchlist,
            session: None,
            pending_fetch: None,
            out,
        }
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run one command. Returns false when the shell should exit.
    pub async fn handle(&mut self, command: Command) -> AppResult<bool> {
        match command {
            Command::Search(text) => {
                self.session = None;
                self.pending_fetch = self.controller.set_query(text).await;
            }
            Command::Clear => {
                self.session = None;
                self.pending_fetch = self.controller.set_query("").await;
            }
            Command::Next => {
                let fetch = self.controller.next().await;
                self.show_page(fetch).await?;
            }
            Command::Prev => {
                let fetch = self.controller.prev().await;
                self.show_page(fetch).await?;
            }
            Command::Refresh => match self.controller.refresh().await {
                Some(fetch) => {
                    await_fetch(fetch).await;
                    self.show_results().await?;
                }
                None => writeln!(self.out, "Nothing to refresh, search for something first")?,
            },
            Command::Open(n) => {
                let movie = self.result(n).await?;
                self.open_detail(movie)?;
            }
            Command::Watch(index) => {
                if let Some(n) = index {
                    let movie = self.result(n).await?;
                    self.session = Some(ReviewSession::open(movie, &self.watchlist));
                }
                let session = open_session(&mut self.session)?;
                session.set_watched(true, &mut self.watchlist).await?;
                self.show_session()?;
            }
            Command::Unwatch => {
                let session = open_session(&mut self.session)?;
                session.set_watched(false, &mut self.watchlist).await?;
                self.show_session()?;
            }
            Command::Rate(stars) => {
                open_session(&mut self.session)?.select_star(stars);
                self.show_session()?;
            }
            Command::Review(text) => {
                open_session(&mut self.session)?.set_review(text);
                self.show_session()?;
            }
            Command::Submit => {
                let session = open_session(&mut self.session)?;
                match session.submit(&mut self.watchlist).await {
                    Ok(SubmitOutcome::Saved) => writeln!(self.out, "Review saved")?,
                    Ok(SubmitOutcome::AlreadySubmitted) => writeln!(
                        self.out,
                        "Already submitted; /unwatch to start over"
                    )?,
                    Ok(SubmitOutcome::NotWatched) => {
                        writeln!(self.out, "Mark the movie as watched first (/watch)")?
                    }
                    Err(AppError::Validation(e)) => writeln!(self.out, "{e}")?,
                    Err(e) => return Err(e),
                }
            }
            Command::Watched(None) => render_watched(&mut self.out, self.watchlist.records())?,
            Command::Watched(Some(n)) => {
                let movie = n
                    .checked_sub(1)
                    .and_then(|index| self.watchlist.records().get(index))
                    .map(|record| record.movie.clone())
                    .ok_or_else(|| {
                        AppError::InvalidInput(format!("No watched movie number {n}"))
                    })?;
                self.open_detail(movie)?;
            }
            Command::Help => render::render_help(&mut self.out)?,
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// React to a controller event
    pub async fn on_event(&mut self, event: SearchEvent) -> AppResult<()> {
        match event {
            SearchEvent::ShowResults { query } => {
                tracing::debug!(query = %query, "Showing results");
                if let Some(fetch) = self.pending_fetch.take() {
                    await_fetch(fetch).await;
                }
                self.show_results().await?;
            }
            SearchEvent::QueryCleared => writeln!(self.out, "Search cleared")?,
            // The page view already starts with its own separator
            SearchEvent::ScrollToTop => tracing::debug!("Scrolled to top of results"),
        }
        Ok(())
    }

    async fn show_page(&mut self, fetch: Option<JoinHandle<()>>) -> AppResult<()> {
        let Some(fetch) = fetch else {
            if self.controller.snapshot().await.is_loading {
                writeln!(self.out, "Still loading, try again in a moment")?;
            } else {
                writeln!(self.out, "No more pages that way")?;
            }
            return Ok(());
        };

        writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        await_fetch(fetch).await;
        self.session = None;
        self.show_results().await
    }

    async fn show_results(&mut self) -> AppResult<()> {
        let snapshot = self.controller.snapshot().await;
        let details = self.details().await;
        render_results(&mut self.out, &snapshot, &details)?;
        Ok(())
    }

    fn open_detail(&mut self, movie: MovieDetail) -> AppResult<()> {
        let session = ReviewSession::open(movie, &self.watchlist);
        render_detail(&mut self.out, session.movie(), &session)?;
        self.session = Some(session);
        Ok(())
    }

    fn show_session(&mut self) -> AppResult<()> {
        if let Some(session) = &self.session {
            session.render(&mut self.out)?;
        }
        Ok(())
    }

    async fn details(&self) -> DetailState {
        match self.controller.enricher() {
            Some(enricher) => enricher.state().await,
            None => DetailState::NoMovies,
        }
    }

    async fn result(&self, n: usize) -> AppResult<MovieDetail> {
        let details = self.details().await;
        n.checked_sub(1)
            .and_then(|index| details.details().get(index))
            .cloned()
            .ok_or_else(|| AppError::InvalidInput(format!("No result number {n} on this page")))
    }
}

async fn await_fetch(fetch: JoinHandle<()>) {
    if let Err(e) = fetch.await {
        tracing::error!(error = %e, "Fetch task failed");
    }
}

fn open_session(session: &mut Option<ReviewSession>) -> AppResult<&mut ReviewSession> {
    session
        .as_mut()
        .ok_or_else(|| AppError::InvalidInput("Open a movie first with /open <n>".to_string()))
}
