use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::budget::Verdict;
use crate::report::format_amount;
use crate::ui::app::{App, Focus};
use crate::ui::theme;
use crate::ui::util::{fill_ratio, progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Totals
            Constraint::Min(5),    // Budgets and transactions
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_totals(f, chunks[1], app);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_budgets(f, panes[0], app);
    render_transactions(f, panes[1], app);

    render_status_bar(f, chunks[3], app);
}

/// Rows available inside a bordered pane of the given total height.
pub(crate) fn pane_rows(total_height: u16) -> usize {
    // header, totals, status bar, and the pane borders
    (total_height.saturating_sub(1 + 3 + 1 + 2) as usize).max(1)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Budget Ledger │ user {} │ {} ", app.user_id, app.period_label());
    f.render_widget(Paragraph::new(title).style(theme::header_style()), area);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let totals = &app.report.totals;
    let net = app.report.net();
    let net_style = if net < Decimal::ZERO {
        theme::expense_style()
    } else {
        theme::income_style()
    };

    let line = Line::from(vec![
        Span::styled(" Income ", theme::dim_style()),
        Span::styled(format_amount(totals.income), theme::income_style()),
        Span::styled("   Expenses ", theme::dim_style()),
        Span::styled(format_amount(totals.expense), theme::expense_style()),
        Span::styled("   Net ", theme::dim_style()),
        Span::styled(format_amount(net), net_style.add_modifier(Modifier::BOLD)),
        Span::styled(format!("   {} transactions", totals.count), theme::dim_style()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(false));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_budgets(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Budgets;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(focused))
        .title(Span::styled(
            format!(" Categories ({} over budget) ", app.report.exceeded_count()),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    if app.report.categories.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No transactions or budgets yet", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Use `budgetledger add` and `budgetledger budget` to get started",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let cursor = app.budget_cursor;
    let items: Vec<ListItem> = app
        .report
        .categories
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, line)| {
            let status = &line.status;
            let ratio = fill_ratio(status.usage());
            let color = theme::verdict_color(status.verdict, ratio);

            let row_style = if focused && i == cursor.index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let mut spans = vec![Span::styled(
                format!("{:<16}", truncate(&line.category, 15)),
                row_style,
            )];
            match status.budget_amount {
                Some(limit) => {
                    spans.push(Span::styled(
                        format!(
                            "{}/{} ",
                            format_amount(status.expense_total),
                            format_amount(limit)
                        ),
                        Style::default().fg(color),
                    ));
                    spans.push(Span::styled(progress_bar(ratio, 12), Style::default().fg(color)));
                    let mark = if status.verdict == Verdict::BudgetExceeded {
                        " over"
                    } else {
                        ""
                    };
                    spans.push(Span::styled(
                        format!(" {:.0}%{mark}", ratio * 100.0),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ));
                }
                None => {
                    spans.push(Span::styled(
                        format!("{} ", format_amount(status.expense_total)),
                        theme::dim_style(),
                    ));
                    spans.push(Span::styled(status.verdict.as_str(), Style::default().fg(color)));
                }
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_transactions(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Transactions;
    let cursor = app.txn_cursor;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(focused))
        .title(Span::styled(
            " Transactions ",
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let items: Vec<ListItem> = app
        .transactions
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, txn)| {
            let row_style = if focused && i == cursor.index {
                theme::selected_style()
            } else {
                theme::normal_style()
            };
            let amount_style = if txn.is_income() {
                theme::income_style()
            } else {
                theme::expense_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", txn.timestamp.format("%Y-%m-%d")), theme::dim_style()),
                Span::styled(format!("{:<14}", truncate(&txn.category, 13)), row_style),
                Span::styled(format!("{:>14}", format_amount(txn.signed_amount())), amount_style),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(format!(" {} ", app.status_message), theme::status_bar_style()),
        Span::styled(
            " j/k move  Tab switch  m month/all  r refresh  q quit ",
            theme::status_bar_style(),
        ),
    ]);
    f.render_widget(Paragraph::new(line).style(theme::status_bar_style()), area);
}
