//! Table renderers for [`ScheduleGrid`].

use crate::grid::{LessonCell, ScheduleGrid, SlotRow};
use crate::lesson::SubGroup;
use std::fmt::Write;

/// Merged-cell HTML table. Pair labels span their group via `pair_row_span`. A full-pair
/// lesson spans two rows unless a half-pair lesson of another sub-group shares the
/// column, in which case each row gets its own cell and the continuation shows `〃`.
pub fn render_html(grid: &ScheduleGrid) -> String {
    let columns = grid.class_groups.len() + 2;
    let mut out = String::new();
    out.push_str("<table class=\"schedule\">\n<thead>\n<tr><th>Пара</th><th>Час</th>");
    for group in &grid.class_groups {
        let _ = write!(out, "<th>{}</th>", escape(&group.to_string()));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    if grid.is_empty() {
        let _ = writeln!(
            out,
            "<tr><td colspan=\"{columns}\" class=\"empty\">Розклад відсутній</td></tr>"
        );
    }

    for schedule in grid.days.values() {
        let _ = writeln!(
            out,
            "<tr class=\"day\"><th colspan=\"{columns}\">{}</th></tr>",
            escape(&schedule.label)
        );
        for (slot, row) in &schedule.rows {
            let prev = slot.checked_sub(1).and_then(|s| schedule.rows.get(&s));
            let next = schedule.rows.get(&(slot + 1));
            out.push_str("<tr>");
            if row.show_pair_label {
                let _ = write!(
                    out,
                    "<td class=\"pair\" rowspan=\"{}\">{}</td>",
                    row.pair_row_span,
                    escape(&row.pair_label)
                );
            }
            let _ = write!(out, "<td class=\"time\">{}</td>", escape(&row.time));
            for group in &grid.class_groups {
                if prev.is_some_and(|prev| merges_with_next(prev, Some(row), group.id)) {
                    continue;
                }
                let span = if merges_with_next(row, next, group.id) { 2 } else { 1 };
                render_html_cell(&mut out, row.cells_for(group.id), span);
            }
            out.push_str("</tr>\n");
        }
    }

    out.push_str("</tbody>\n</table>\n");
    out
}

/// A column merges two rows only when it holds nothing but full-pair heads and
/// the row below holds nothing but their continuations.
fn merges_with_next(row: &SlotRow, next: Option<&SlotRow>, class_group_id: u32) -> bool {
    let cells = row.cells_for(class_group_id);
    let Some(next) = next else {
        return false;
    };
    let below = next.cells_for(class_group_id);
    !cells.is_empty()
        && cells.iter().all(|c| c.row_span == 2 && !c.skip_render)
        && !below.is_empty()
        && below.iter().all(|c| c.skip_render)
}

fn render_html_cell(out: &mut String, cells: &[LessonCell], span: u8) {
    if cells.is_empty() {
        out.push_str("<td></td>");
        return;
    }
    if span > 1 {
        let _ = write!(out, "<td rowspan=\"{span}\">");
    } else {
        out.push_str("<td>");
    }
    for cell in cells {
        if cell.skip_render {
            out.push_str("<div class=\"lesson continuation\">〃</div>");
            continue;
        }
        out.push_str("<div class=\"lesson\">");
        let _ = write!(out, "<span class=\"subject\">{}</span>", escape(&cell.subject.name));
        if cell.sub_group != SubGroup::WholeClass {
            let _ = write!(
                out,
                " <span class=\"sub-group\">{}</span>",
                escape(cell.sub_group.label())
            );
        }
        if !cell.cabinet.is_empty() {
            let _ = write!(out, " <span class=\"cabinet\">{}</span>", escape(&cell.cabinet));
        }
        out.push_str("</div>");
    }
    out.push_str("</td>");
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Plain text table, one block per day. Continuation halves of full pairs show `〃`.
pub fn render_text(grid: &ScheduleGrid) -> String {
    let mut headers = vec!["pair".to_string(), "time".to_string()];
    headers.extend(grid.class_groups.iter().map(|g| g.name.clone()));

    let mut out = String::new();
    if grid.is_empty() {
        out.push_str("(no lessons)\n");
        return out;
    }

    for schedule in grid.days.values() {
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(schedule.rows.len());
        for row in schedule.rows.values() {
            let mut cols = vec![
                if row.show_pair_label {
                    row.pair_label.clone()
                } else {
                    String::new()
                },
                row.time.clone(),
            ];
            for group in &grid.class_groups {
                cols.push(text_cell(row.cells_for(group.id)));
            }
            rows.push(cols);
        }
        out.push_str(&schedule.label);
        out.push('\n');
        out.push_str(&render_text_table(&headers, &rows));
    }
    out
}

fn text_cell(cells: &[LessonCell]) -> String {
    cells
        .iter()
        .map(|cell| {
            if cell.skip_render {
                return "〃".to_string();
            }
            let mut text = cell.subject.name.clone();
            if cell.sub_group != SubGroup::WholeClass {
                let _ = write!(text, " [{}]", cell.sub_group.code());
            }
            if !cell.cabinet.is_empty() {
                let _ = write!(text, " ({})", cell.cabinet);
            }
            text
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Boxed ASCII table with columns padded to the widest value.
pub fn render_text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(ci) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_text_row(&mut out, headers, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_text_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_text_row(out: &mut String, values: &[String], widths: &[usize]) {
    out.push('|');
    for (ci, width) in widths.iter().enumerate() {
        let value = values.get(ci).map(String::as_str).unwrap_or("");
        let pad = width.saturating_sub(value.chars().count());
        out.push(' ');
        out.push_str(value);
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
    }
    out.push('\n');
}
