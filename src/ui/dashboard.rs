// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI : une fonction pure de l'état App vers une frame.
// Aucune logique ici à part l'affichage conditionnel piloté par les états
// (connexion, validité, requête) et la liste des résultats.
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Table : grille de tokens (jusqu'à 4 colonnes)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, QueryState, Validity};
use crate::models::{format_balance, short_address, QueryResult};

/// Nombre maximum de colonnes de la grille
pub const MAX_GRID_COLUMNS: usize = 4;

pub const EMPTY_RESULT_TEXT: &str = "No tokens found for this address.";
pub const NO_QUERY_TEXT: &str = "Please make a query! This may take a few seconds...";
pub const LOADING_TEXT: &str = "Retrieving Tokens";

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_wallet(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_query_button(frame, app, chunks[3]);
    render_results(frame, app, chunks[4]);
    render_footer(frame, app, chunks[5]);
}

/// Crée le layout principal
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Wallet
            Constraint::Length(3), // Saisie d'adresse
            Constraint::Length(3), // Bouton de requête
            Constraint::Min(0),    // Résultats
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn spinner(app: &App) -> &'static str {
    SPINNER_FRAMES[app.ticks % SPINNER_FRAMES.len()]
}

fn cyan_block<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

fn render_header(frame: &mut Frame, area: Rect) {
    let text = Line::from(Span::styled(
        "Plug in an address and get all of its ERC-20 token balances!",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text)
        .block(cyan_block(" ERC-20 Token Indexer ").title_alignment(Alignment::Center))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne "wallet" : action de connexion et compte connecté
fn render_wallet(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.connecting {
        Span::styled(
            format!("{} Waiting for wallet...", spinner(app)),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(account) = &app.connected_account {
        Span::styled(format!("Connected: {}", account), Style::default().fg(Color::Green))
    } else if app.wallet_available {
        Span::styled("Not connected", Style::default().fg(Color::Gray))
    } else {
        Span::styled("No wallet configured", Style::default().fg(Color::DarkGray))
    };

    let line = Line::from(vec![
        Span::styled("[c] ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("Check token balances in your Wallet!   "),
        status,
    ]);

    frame.render_widget(Paragraph::new(line).block(cyan_block(" Wallet ")), area);
}

/// Champ de saisie avec l'indicateur de validité à droite
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let indicator = match app.validity() {
        Validity::Checking => Span::styled(spinner(app), Style::default().fg(Color::Blue)),
        Validity::Valid => Span::styled("✓", Style::default().fg(Color::Green)),
        Validity::Invalid => Span::styled("✗", Style::default().fg(Color::Red)),
    };

    let (text, text_style) = if app.input_buffer.is_empty() && !app.is_in_input_mode() {
        ("Enter ETH Address or ENS name".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.input_buffer.clone(), Style::default().fg(Color::White))
    };

    let mut spans = vec![indicator, Span::raw(" "), Span::styled(text, text_style)];
    if app.is_in_input_mode() {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let title = if app.is_in_input_mode() {
        " Address (editing) "
    } else {
        " Address [i] "
    };

    frame.render_widget(Paragraph::new(Line::from(spans)).block(cyan_block(title)), area);
}

/// "Bouton" de requête : actif, désactivé ou en chargement
fn render_query_button(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = if app.is_loading() {
        vec![Span::styled(
            format!("{} {}...", spinner(app), LOADING_TEXT),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]
    } else if app.can_query() {
        vec![
            Span::styled("[Enter] ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled("Check ERC-20 Token Balances", Style::default().fg(Color::Green)),
        ]
    } else {
        vec![Span::styled(
            "[Enter] Check ERC-20 Token Balances (enter a valid address first)",
            Style::default().fg(Color::DarkGray),
        )]
    };

    if let QueryState::Failed(_) = app.query {
        spans.push(Span::styled("   Last query failed", Style::default().fg(Color::Red)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(cyan_block(" Query ")), area);
}

/// Grille des résultats ou message d'état vide
fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let block = cyan_block(results_title(app));

    let message = match &app.result {
        None => Some(NO_QUERY_TEXT),
        Some(result) if result.is_empty() => Some(EMPTY_RESULT_TEXT),
        Some(_) => None,
    };

    match (message, &app.result) {
        (Some(text), _) => {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(text, Style::default().fg(Color::Gray))),
            ])
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
        }
        (None, Some(result)) => {
            frame.render_widget(token_grid(result).block(block), area);
        }
        (None, None) => {}
    }
}

/// Titre du bloc résultats : heure de la requête et métadonnées manquantes
fn results_title(app: &App) -> String {
    if app.is_loading() {
        return " Retrieving... ".to_string();
    }

    let Some(result) = &app.result else {
        return " ERC-20 token balances ".to_string();
    };

    let mut title = format!(
        " ERC-20 token balances · fetched at {} UTC ",
        result.fetched_at.format("%H:%M:%S")
    );
    let missing = result.missing_metadata();
    if missing > 0 {
        title.push_str(&format!("· {} without metadata ", missing));
    }
    title
}

/// Construit la grille : une cellule par token, lignes de 4 cellules max
fn token_grid(result: &QueryResult) -> Table<'static> {
    let columns = result.len().clamp(1, MAX_GRID_COLUMNS);

    let cells: Vec<Cell> = result
        .holdings()
        .map(|(balance, metadata)| {
            let decimals = metadata.and_then(|m| m.decimals);
            let amount = format_balance(&balance.token_balance, decimals);

            let mut lines = match metadata {
                Some(m) => {
                    let mut spans = vec![Span::styled(
                        format!("${}", m.display_symbol()),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )];
                    if let Some(name) = m.name.as_deref().filter(|n| !n.trim().is_empty()) {
                        spans.push(Span::styled(
                            format!(" {}", name),
                            Style::default().fg(Color::Gray),
                        ));
                    }
                    vec![Line::from(spans)]
                }
                None => vec![Line::from(Span::styled(
                    "metadata unavailable",
                    Style::default().fg(Color::Red),
                ))],
            };
            lines.push(Line::from(amount));
            lines.push(Line::from(Span::styled(
                short_address(&balance.contract_address),
                Style::default().fg(Color::DarkGray),
            )));
            if let Some(logo) = metadata.and_then(|m| m.logo.clone()) {
                lines.push(Line::from(Span::styled(logo, Style::default().fg(Color::DarkGray))));
            }

            Cell::from(Text::from(lines))
        })
        .collect();

    // CONCEPT RUST : chunks
    // - Découpe le Vec en tranches de `columns` éléments
    let rows: Vec<Row> = cells
        .chunks(columns)
        .map(|chunk| Row::new(chunk.to_vec()).height(5))
        .collect();

    let widths = vec![Constraint::Ratio(1, columns as u32); columns];
    Table::new(rows, widths).column_spacing(2)
}

/// Footer : raccourcis ou confirmation de quit
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.confirm_quit {
        Line::from(Span::styled(
            "⚠  Appuyez sur [q] à nouveau pour quitter, ou autre touche pour annuler ⚠",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else if app.is_in_input_mode() {
        Line::from(vec![
            Span::styled("[Esc/Enter] ", Style::default().fg(Color::Yellow)),
            Span::raw("Terminer la saisie  "),
            Span::styled("[Backspace] ", Style::default().fg(Color::Yellow)),
            Span::raw("Effacer"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[c] ", Style::default().fg(Color::Yellow)),
            Span::raw("Wallet  "),
            Span::styled("[i] ", Style::default().fg(Color::Yellow)),
            Span::raw("Adresse  "),
            Span::styled("[Enter] ", Style::default().fg(Color::Yellow)),
            Span::raw("Requête  "),
            Span::styled("[q] ", Style::default().fg(Color::Yellow)),
            Span::raw("Quitter"),
        ])
    };

    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::models::{TokenBalance, TokenMetadata};

    /// Rend l'app dans un terminal virtuel et retourne le texte affiché
    fn render_to_string(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_initial_screen_asks_for_query() {
        let output = render_to_string(&App::new());
        assert!(output.contains(NO_QUERY_TEXT));
        assert!(output.contains("✗"));
    }

    #[test]
    fn test_empty_result_message() {
        let mut app = App::new();
        app.result = Some(QueryResult::new("0x00".to_string(), vec![], vec![]));

        let output = render_to_string(&app);
        assert!(output.contains(EMPTY_RESULT_TEXT));
        assert!(!output.contains(NO_QUERY_TEXT));
    }

    #[test]
    fn test_grid_shows_symbol_and_amount() {
        let mut app = App::new();
        app.result = Some(QueryResult::new(
            "0x00".to_string(),
            vec![
                TokenBalance::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "1500000000000000000"),
                TokenBalance::new("0xdac17f958d2ee523a2206206994597c13d831ec7", "100"),
            ],
            vec![Some(TokenMetadata::new("USDX", 18)), Some(TokenMetadata::new("RAW", 0))],
        ));

        let output = render_to_string(&app);
        assert!(output.contains("$USDX"));
        assert!(output.contains("1.5"));
        assert!(output.contains("$RAW"));
        assert!(output.contains("100.0"));
        assert!(output.contains("0xa0b8…eb48"));
        assert!(!output.contains(EMPTY_RESULT_TEXT));
    }

    #[test]
    fn test_partial_metadata_marker() {
        let mut app = App::new();
        app.result = Some(QueryResult::new(
            "0x00".to_string(),
            vec![TokenBalance::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "1")],
            vec![None],
        ));

        let output = render_to_string(&app);
        assert!(output.contains("metadata unavailable"));
        assert!(output.contains("1 without metadata"));
    }

    #[test]
    fn test_results_title_shows_fetch_time() {
        let mut result = QueryResult::new(
            "0x00".to_string(),
            vec![TokenBalance::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "1")],
            vec![Some(TokenMetadata::new("USDX", 0))],
        );
        result.fetched_at = Utc.with_ymd_and_hms(2024, 1, 2, 13, 45, 7).unwrap();

        let mut app = App::new();
        app.result = Some(result);

        let output = render_to_string(&app);
        assert!(output.contains("fetched at 13:45:07 UTC"));
        assert!(!output.contains("without metadata"));
    }

    #[test]
    fn test_grid_shows_token_name() {
        let metadata = TokenMetadata {
            name: Some("USD Coin".to_string()),
            ..TokenMetadata::new("USDC", 6)
        };
        let mut app = App::new();
        app.result = Some(QueryResult::new(
            "0x00".to_string(),
            vec![TokenBalance::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "2500000")],
            vec![Some(metadata)],
        ));

        let output = render_to_string(&app);
        assert!(output.contains("$USDC USD Coin"));
        assert!(output.contains("2.5"));
    }

    #[test]
    fn test_loading_label() {
        let mut app = App::new();
        app.start_fetch("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".to_string());
        assert!(render_to_string(&app).contains(LOADING_TEXT));
    }

    #[test]
    fn test_quit_confirmation_footer() {
        let mut app = App::new();
        app.confirm_quit = true;
        assert!(render_to_string(&app).contains("[q] à nouveau"));
    }
}
