//! Plain-text views for the terminal driver.

use std::io::{self, Write};

use crate::{
    models::{MovieDetail, Rating, WatchedRecord},
    services::{DetailState, ReviewSession, SearchSnapshot, WatchStatus},
};

const MISSING: &str = "N/A";

/// Renders whatever sits under a movie's detail block
pub trait ReviewPanel {
    fn render(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Detail view without a review form
pub struct NoPanel;

impl ReviewPanel for NoPanel {
    fn render(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

impl ReviewPanel for ReviewSession {
    fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let checkbox = if self.is_watched() { "[x]" } else { "[ ]" };
        writeln!(out, "{checkbox} Watched")?;

        match self.status() {
            WatchStatus::Unwatched => {}
            WatchStatus::Watching => {
                writeln!(out, "Rating: {}", stars(self.rating()))?;
                writeln!(out, "Review: {}", self.review())?;
                if self.can_submit() {
                    writeln!(out, "Ready to submit (/submit)")?;
                }
            }
            WatchStatus::Submitted => {
                writeln!(out, "Rating: {}", stars(self.rating()))?;
                writeln!(out, "Review: {}", self.review())?;
                writeln!(out, "Review submitted")?;
            }
        }

        writeln!(out, "Watch online: {}", self.movie().watch_link())
    }
}

/// Full detail block for one movie followed by `panel`
pub fn render_detail(
    out: &mut dyn Write,
    movie: &MovieDetail,
    panel: &dyn ReviewPanel,
) -> io::Result<()> {
    writeln!(out, "{} ({})", movie.title, movie.year)?;
    writeln!(out, "  Rated:      {}", or_missing(&movie.rated))?;
    writeln!(out, "  Released:   {}", or_missing(&movie.released))?;
    writeln!(out, "  Runtime:    {}", or_missing(&movie.runtime))?;
    writeln!(out, "  Genre:      {}", genres(movie))?;
    writeln!(out, "  Director:   {}", or_missing(&movie.director))?;
    writeln!(out, "  Actors:     {}", or_missing(&movie.actors))?;
    writeln!(out, "  IMDb:       {}", or_missing(&movie.imdb_rating))?;
    writeln!(out, "  Box office: {}", or_missing(&movie.box_office))?;
    writeln!(out, "  Poster:     {}", or_missing(&movie.poster))?;
    writeln!(out, "  Plot:       {}", or_missing(&movie.plot))?;
    writeln!(out)?;
    panel.render(out)
}

/// Numbered result list plus pagination controls
pub fn render_results(
    out: &mut dyn Write,
    snapshot: &SearchSnapshot,
    details: &DetailState,
) -> io::Result<()> {
    writeln!(out, "Results for \"{}\"", snapshot.query)?;

    match details {
        DetailState::Loading => writeln!(out, "Loading...")?,
        DetailState::NoMovies => writeln!(out, "No movie available")?,
        DetailState::ConnectionFailed => writeln!(out, "Error fetching data")?,
        DetailState::Ready(movies) => {
            for (index, movie) in movies.iter().enumerate() {
                writeln!(
                    out,
                    "{:>2}. {} ({}) | {} | IMDb {}",
                    index + 1,
                    movie.title,
                    movie.year,
                    genres(movie),
                    or_missing(&movie.imdb_rating)
                )?;
            }
        }
    }

    let controls = snapshot.controls();
    if controls.visible {
        let prev = if controls.prev_enabled { "<prev" } else { "     " };
        let next = if controls.next_enabled { "next>" } else { "     " };
        writeln!(out, "{prev}  {}  {next}", controls.label)?;
    }
    Ok(())
}

pub fn render_watched(out: &mut dyn Write, records: &[WatchedRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No watched movies yet");
    }

    for record in records {
        writeln!(
            out,
            "{} ({})  {}  watched {}",
            record.movie.title,
            record.movie.year,
            record.user_rating,
            record.watched_date.format("%Y-%m-%d")
        )?;
        writeln!(out, "    {}", record.user_review)?;
    }
    Ok(())
}

pub fn render_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "\
Commands:
  <text> | /search <text>  search the catalog
  /clear                   clear the search
  /next, /prev             change page
  /refresh                 fetch the current page again
  /open <n>                show details for result n
  /watch [n]               mark the open movie (or result n) as watched
  /unwatch                 unmark the open movie and delete its review
  /rate <1-5>              pick a star rating (same value again clears it)
  /review <text>           write the review
  /submit                  save the review
  /watched [n]             list watched movies, or open watched movie n
  /help                    show this help
  /quit                    exit"
    )
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(Rating::MAX));
    let empty = usize::from(Rating::MAX) - filled;
    format!("{}{}", "*".repeat(filled), ".".repeat(empty))
}

fn or_missing(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}

fn genres(movie: &MovieDetail) -> String {
    if movie.genres.is_empty() {
        MISSING.to_string()
    } else {
        movie.genres.join(", ")
    }
}
