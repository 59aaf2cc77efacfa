//! Paint the search page and whatever the overlays asked for.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType},
};
use overlay_core::{ComputedPosition, RenderPlan, Size, Viewport};
use unicode_width::UnicodeWidthChar;

use crate::app::{Filter, SearchBar};
use crate::host::{self, PAGE_HEIGHT};

pub fn draw(out: &mut impl Write, bar: &SearchBar) -> io::Result<()> {
    let viewport = bar.viewport;
    queue!(
        out,
        terminal::BeginSynchronizedUpdate,
        terminal::Clear(ClearType::All)
    )?;

    draw_page(out, bar)?;

    for filter in &bar.filters {
        match &filter.plan {
            RenderPlan::Floating { position, size } => {
                draw_panel(out, filter, *position, *size, &viewport)?;
            }
            RenderPlan::Sheet {
                offset_y,
                height,
                title,
                ..
            } => draw_sheet(out, filter, *offset_y, *height, title.as_deref(), &viewport)?,
            // Measuring content stays invisible; cells are one size, so the
            // measured size is already known.
            RenderPlan::Measuring { .. } | RenderPlan::TriggerOnly => {}
        }
    }

    queue!(out, terminal::EndSynchronizedUpdate)?;
    out.flush()
}

fn draw_page(out: &mut impl Write, bar: &SearchBar) -> io::Result<()> {
    let viewport = bar.viewport;
    let width = viewport.width as u16;

    for row in 0..viewport.height as u16 {
        let document_row = row as f32 + viewport.scroll_y;
        if document_row >= PAGE_HEIGHT {
            break;
        }
        match document_row as u16 {
            1 => {
                queue!(out, SetAttribute(Attribute::Bold))?;
                put(out, 2, row, "Find a clinic", width)?;
                queue!(out, SetAttribute(Attribute::Reset))?;
            }
            n if n >= 6 && n % 2 == 0 => {
                queue!(out, SetAttribute(Attribute::Dim))?;
                let line = format!("Clinic #{:02}  ·  open today  ·  {} km", n / 2 - 2, n % 7 + 1);
                put(out, 4, row, &line, width)?;
                queue!(out, SetAttribute(Attribute::Reset))?;
            }
            _ => {}
        }
    }

    let triggers = bar.trigger_rects();
    for (filter, rect) in bar.filters.iter().zip(triggers) {
        if rect.y < 0.0 || rect.y >= viewport.height {
            continue;
        }
        if filter.controller.is_open() {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        put(out, rect.x as u16, rect.y as u16, &filter.trigger_label(), width)?;
        queue!(out, SetAttribute(Attribute::Reset))?;
    }

    if let Some(last) = (viewport.height as u16).checked_sub(1) {
        queue!(out, SetAttribute(Attribute::Dim))?;
        put(out, 0, last, " 1/2 filters  Esc close  wheel scroll  q quit", width)?;
        queue!(out, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

fn draw_panel(
    out: &mut impl Write,
    filter: &Filter,
    position: ComputedPosition,
    size: Size,
    viewport: &Viewport,
) -> io::Result<()> {
    let left = position.left.max(0.0) as u16;
    let top = host::to_viewport_row(position.top, viewport);
    let inner = (size.width as usize).saturating_sub(2);
    let rows = size.height as usize;
    let clip = viewport.width as u16;

    for line in 0..rows {
        let y = top + line as f32;
        if y < 0.0 || y >= viewport.height {
            continue;
        }
        let text = if line == 0 {
            format!("┌{}┐", "─".repeat(inner))
        } else if line + 1 == rows {
            format!("└{}┘", "─".repeat(inner))
        } else {
            let index = line - 1;
            let label = filter.options.get(index).copied().unwrap_or("");
            let marker = if filter.selected == Some(index) { '•' } else { ' ' };
            format!("│{}│", pad(&format!("{marker} {label}"), inner))
        };
        put(out, left, y as u16, &text, clip)?;
    }
    Ok(())
}

fn draw_sheet(
    out: &mut impl Write,
    filter: &Filter,
    offset_y: f32,
    height: f32,
    title: Option<&str>,
    viewport: &Viewport,
) -> io::Result<()> {
    let width = viewport.width as usize;
    let top = (viewport.height - height.round() + offset_y.round()).max(0.0) as u16;
    let bottom = viewport.height as u16;

    let handle = format!("━━━  {}  ━━━", title.unwrap_or(""));
    queue!(out, SetAttribute(Attribute::Reverse))?;
    put(out, 0, top, &center(&handle, width), width as u16)?;

    for (row, index) in (top + 1..bottom).zip(0..) {
        let text = match filter.options.get(index) {
            Some(label) => {
                let marker = if filter.selected == Some(index) { '•' } else { ' ' };
                format!(" {marker} {label}")
            }
            None => String::new(),
        };
        put(out, 0, row, &pad(&text, width), width as u16)?;
    }
    queue!(out, SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Print `text` at (x, y), cut off at column `clip`.
fn put(out: &mut impl Write, x: u16, y: u16, text: &str, clip: u16) -> io::Result<()> {
    if x >= clip {
        return Ok(());
    }
    let budget = (clip - x) as usize;
    let mut used = 0;
    let visible: String = text
        .chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    queue!(out, cursor::MoveTo(x, y), Print(visible))
}

fn pad(text: &str, width: usize) -> String {
    let used: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

fn center(text: &str, width: usize) -> String {
    let used: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    let left = width.saturating_sub(used) / 2;
    pad(&format!("{}{text}", " ".repeat(left)), width)
}
