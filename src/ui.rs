use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fruit_dashboard::{
    analytics::{self, SearchFilter, NO_RESULTS},
    assets::{ImageAsset, ImageResolver},
    catalog::{Catalog, FruitRecord, NO_DATA},
    category::{categorize, BotanicalCategory},
    config::AppConfig,
    nutrition::{FruitDetail, NutritionTable},
    recommend::{self, AgeGroup, Condition, HealthGoal, Recommendation, EATING_TIPS},
    trend::{SeasonalSample, TrendSimulator},
    views::{HomeSummary, View, HOME_TIPS},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::warn;

/// Sub-pages of the price view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSection {
    Overview,
    Detail,
    Seasonal,
    Search,
    Cheapest,
}

impl PriceSection {
    const ALL: [PriceSection; 5] = [
        PriceSection::Overview,
        PriceSection::Detail,
        PriceSection::Seasonal,
        PriceSection::Search,
        PriceSection::Cheapest,
    ];

    pub fn next(&self) -> Self {
        cycle(&Self::ALL, *self, true)
    }

    pub fn previous(&self) -> Self {
        cycle(&Self::ALL, *self, false)
    }

    pub fn title(&self) -> &str {
        match self {
            PriceSection::Overview => "분류별 개요",
            PriceSection::Detail => "분류 상세",
            PriceSection::Seasonal => "계절별 동향",
            PriceSection::Search => "가격 검색",
            PriceSection::Cheapest => "최저가",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Goal,
    Age,
    Condition,
}

#[derive(Debug, Clone)]
pub struct RecommendForm {
    pub goal: HealthGoal,
    pub age: AgeGroup,
    pub condition: Condition,
    pub focus: FormField,
}

impl Default for RecommendForm {
    fn default() -> Self {
        Self {
            goal: HealthGoal::Diet,
            age: AgeGroup::Child,
            condition: Condition::Male,
            focus: FormField::Goal,
        }
    }
}

impl RecommendForm {
    fn move_focus(&mut self, forward: bool) {
        self.focus = cycle(
            &[FormField::Goal, FormField::Age, FormField::Condition],
            self.focus,
            forward,
        );
    }

    fn change_value(&mut self, forward: bool) {
        match self.focus {
            FormField::Goal => self.goal = cycle(&HealthGoal::ALL, self.goal, forward),
            FormField::Age => self.age = cycle(&AgeGroup::ALL, self.age, forward),
            FormField::Condition => {
                self.condition = cycle(&Condition::ALL, self.condition, forward)
            }
        }
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let i = all.iter().position(|x| *x == current).unwrap_or(0);
    let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
    all[next]
}

pub struct App {
    catalog: Catalog,
    pub records: Vec<FruitRecord>,
    pub priced: Vec<FruitRecord>,
    pub samples: Vec<SeasonalSample>,
    pub nutrition: NutritionTable,
    pub images: ImageResolver,
    /// Set when the catalog could not be read; views show it instead of data
    pub empty_state: Option<String>,
    /// One-line error from the last action, shown in the status bar
    pub status: Option<String>,
    pub month: u32,
    pub display_limit: usize,
    pub current_view: View,

    // 영양 성분 분석
    pub fruit_names: Vec<String>,
    pub search_term: String,
    pub search_mode: bool,
    pub list_state: TableState,
    pub detail: Option<FruitDetail>,

    // 가격 정보
    pub price_section: PriceSection,
    pub overview_state: TableState,
    pub filter: SearchFilter,

    // 건강 추천
    pub form: RecommendForm,
    pub recommendation: Option<Recommendation>,
}

impl App {
    /// Load everything the pages need. An unreadable catalog is not fatal:
    /// the app starts with no records and an empty-state message.
    pub fn load(config: &AppConfig, month: u32) -> Self {
        let catalog = Catalog::new(&config.db_path);

        let (records, fruit_names, empty_state) = match catalog
            .all_fruits()
            .and_then(|records| Ok((records, catalog.unique_names()?)))
        {
            Ok((records, fruit_names)) => (records, fruit_names, None),
            Err(e) => {
                warn!(error = %e, "catalog unavailable");
                let message = if e.is_empty_state() {
                    format!("데이터베이스를 찾을 수 없습니다: {}", config.db_path.display())
                } else {
                    format!("데이터를 불러오지 못했습니다: {}", e)
                };
                (Vec::new(), Vec::new(), Some(message))
            }
        };

        let nutrition = NutritionTable::load(&config.nutrition_path).unwrap_or_else(|e| {
            warn!(error = %e, "nutrition table unreadable, continuing without it");
            NutritionTable::default()
        });

        let samples = TrendSimulator::from_config(config.trend_seed).simulate(&records);

        let mut app = Self::from_parts(
            catalog,
            records,
            fruit_names,
            samples,
            nutrition,
            ImageResolver::new(&config.assets_dir),
            month,
        );
        app.empty_state = empty_state;
        app.display_limit = config.display_limit;
        app
    }

    pub fn from_parts(
        catalog: Catalog,
        records: Vec<FruitRecord>,
        fruit_names: Vec<String>,
        samples: Vec<SeasonalSample>,
        nutrition: NutritionTable,
        images: ImageResolver,
        month: u32,
    ) -> Self {
        let priced = analytics::filter_priced(&records);

        let mut app = Self {
            catalog,
            records,
            priced,
            samples,
            nutrition,
            images,
            empty_state: None,
            status: None,
            month,
            display_limit: recommend::DEFAULT_DISPLAY_LIMIT,
            current_view: View::Home,
            fruit_names,
            search_term: String::new(),
            search_mode: false,
            list_state: TableState::default(),
            detail: None,
            price_section: PriceSection::Overview,
            overview_state: TableState::default(),
            filter: SearchFilter::default(),
            form: RecommendForm::default(),
            recommendation: None,
        };
        app.reset_page_state();
        app
    }

    /// Page-local state does not survive navigation
    fn reset_page_state(&mut self) {
        self.status = None;
        self.search_term.clear();
        self.search_mode = false;
        self.detail = None;
        self.list_state
            .select(if self.filtered_names().is_empty() { None } else { Some(0) });

        self.price_section = PriceSection::Overview;
        self.overview_state
            .select(if self.priced.is_empty() { None } else { Some(0) });
        self.filter = SearchFilter::default();

        self.form = RecommendForm::default();
        self.recommendation = None;
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
        self.reset_page_state();
    }

    pub fn previous_view(&mut self) {
        self.current_view = self.current_view.previous();
        self.reset_page_state();
    }

    // ------------------------------------------------------------------
    // Nutrition page
    // ------------------------------------------------------------------

    pub fn filtered_names(&self) -> Vec<&String> {
        self.fruit_names
            .iter()
            .filter(|name| name.contains(self.search_term.as_str()))
            .collect()
    }

    fn first_variety(&self, name: &str) -> Option<&FruitRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_term.push(c);
        self.after_search_change();
    }

    pub fn pop_search_char(&mut self) {
        self.search_term.pop();
        self.after_search_change();
    }

    fn after_search_change(&mut self) {
        self.detail = None;
        self.list_state
            .select(if self.filtered_names().is_empty() { None } else { Some(0) });
    }

    /// Open the detail panel for the selected fruit, or close it
    pub fn toggle_detail(&mut self) {
        if self.detail.is_some() {
            self.detail = None;
            return;
        }

        let name = match self
            .list_state
            .selected()
            .and_then(|i| self.filtered_names().get(i).map(|n| n.to_string()))
        {
            Some(name) => name,
            None => return,
        };

        match self.catalog.varieties(&name, None) {
            Ok(varieties) => {
                self.status = None;
                self.detail = FruitDetail::build(&name, varieties, &self.nutrition);
            }
            Err(e) => {
                self.status = Some(format!("{} 정보를 불러오지 못했습니다: {}", name, e));
                self.detail = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Price page
    // ------------------------------------------------------------------

    pub fn selected_category(&self) -> Option<BotanicalCategory> {
        let overview = analytics::category_overview(&self.priced);
        self.overview_state
            .selected()
            .and_then(|i| overview.get(i).map(|c| c.category))
    }

    pub fn cycle_filter_category(&mut self) {
        let mut options: Vec<Option<BotanicalCategory>> = vec![None];
        options.extend(analytics::present_categories(&self.priced).into_iter().map(Some));
        self.filter.category = cycle(&options, self.filter.category, true);
        self.filter.name = None;
    }

    pub fn cycle_filter_name(&mut self) {
        let mut options: Vec<Option<String>> = vec![None];
        for name in &self.fruit_names {
            let in_category = self
                .filter
                .category
                .map_or(true, |category| categorize(name) == category);
            if in_category && self.priced.iter().any(|r| &r.name == name) {
                options.push(Some(name.clone()));
            }
        }

        let i = options
            .iter()
            .position(|o| *o == self.filter.name)
            .unwrap_or(0);
        self.filter.name = options[(i + 1) % options.len()].clone();
    }

    pub fn cycle_sort_order(&mut self) {
        self.filter.order = self.filter.order.next();
    }

    // ------------------------------------------------------------------
    // Recommendation page
    // ------------------------------------------------------------------

    pub fn submit_form(&mut self) {
        self.recommendation = Some(recommend::recommend(
            self.form.goal,
            self.form.age,
            self.form.condition,
        ));
    }

    // ------------------------------------------------------------------
    // Selection movement
    // ------------------------------------------------------------------

    fn active_len(&self) -> usize {
        match self.current_view {
            View::Nutrition => self.filtered_names().len(),
            View::Prices => analytics::category_overview(&self.priced).len(),
            _ => 0,
        }
    }

    fn active_state(&mut self) -> Option<&mut TableState> {
        match self.current_view {
            View::Nutrition if self.detail.is_none() => Some(&mut self.list_state),
            View::Prices
                if matches!(
                    self.price_section,
                    PriceSection::Overview | PriceSection::Detail
                ) =>
            {
                Some(&mut self.overview_state)
            }
            _ => None,
        }
    }

    pub fn next(&mut self) {
        if self.current_view == View::Recommendations {
            self.form.move_focus(true);
            return;
        }
        let len = self.active_len();
        if len == 0 {
            return;
        }
        if let Some(state) = self.active_state() {
            let i = match state.selected() {
                Some(i) if i < len - 1 => i + 1,
                _ => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        if self.current_view == View::Recommendations {
            self.form.move_focus(false);
            return;
        }
        let len = self.active_len();
        if len == 0 {
            return;
        }
        if let Some(state) = self.active_state() {
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        if app.search_mode {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => app.search_mode = false,
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Char(c) => app.push_search_char(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    app.previous_view();
                } else {
                    app.next_view();
                }
            }
            KeyCode::BackTab => app.previous_view(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Right | KeyCode::Char('l') => match app.current_view {
                View::Prices => app.price_section = app.price_section.next(),
                View::Recommendations => app.form.change_value(true),
                _ => {}
            },
            KeyCode::Left | KeyCode::Char('h') => match app.current_view {
                View::Prices => app.price_section = app.price_section.previous(),
                View::Recommendations => app.form.change_value(false),
                _ => {}
            },
            KeyCode::Enter => match app.current_view {
                View::Nutrition => app.toggle_detail(),
                View::Prices if app.price_section == PriceSection::Overview => {
                    app.price_section = PriceSection::Detail
                }
                View::Recommendations => app.submit_form(),
                _ => {}
            },
            KeyCode::Char('/') if app.current_view == View::Nutrition => {
                app.detail = None;
                app.search_mode = true;
            }
            KeyCode::Char('c') if app.price_section == PriceSection::Search => {
                app.cycle_filter_category()
            }
            KeyCode::Char('n') if app.price_section == PriceSection::Search => {
                app.cycle_filter_name()
            }
            KeyCode::Char('s') if app.price_section == PriceSection::Search => {
                app.cycle_sort_order()
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if let Some(message) = &app.empty_state {
        render_empty_state(f, chunks[1], message, app.current_view);
    } else {
        match app.current_view {
            View::Home => render_home(f, chunks[1], app),
            View::Nutrition => render_nutrition(f, chunks[1], app),
            View::Prices => render_prices(f, chunks[1], app),
            View::Recommendations => render_recommendations(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

// ============================================================================
// SHARED WIDGETS
// ============================================================================

fn title_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn header_row(titles: &[&str]) -> Row<'static> {
    let cells: Vec<Cell> = titles
        .iter()
        .map(|h| {
            Cell::from(h.to_string()).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn bordered(title: String, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn won(value: f64) -> String {
    format!("{:.0}원", value)
}

fn signed_won(value: f64) -> String {
    format!("{:+.0}원", value)
}

fn delta_color(delta: f64) -> Color {
    if delta < 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

fn image_label(asset: &ImageAsset) -> String {
    match asset {
        ImageAsset::File(_) => asset.file_name().unwrap_or_default(),
        ImageAsset::Placeholder(symbol) => symbol.to_string(),
    }
}

/// Char-based so multi-byte names never split
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, view) in View::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *view == app.current_view {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(view.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("과일 {}종", app.fruit_names.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("가격 정보 {}건", app.priced.len()),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 🍎 과일 대시보드 "),
    );

    f.render_widget(header, area);
}

fn render_empty_state(f: &mut Frame, area: Rect, message: &str, view: View) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  fruit-dashboard import <csv> 로 데이터를 먼저 가져오세요.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let paragraph =
        Paragraph::new(content).block(bordered(format!(" {} ", view.title()), Color::Red));
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" {} ", app.current_view.title()),
        Style::default().fg(Color::Cyan),
    )];

    let hints: &[(&str, &str)] = match app.current_view {
        View::Home => &[],
        View::Nutrition if app.search_mode => &[("Enter", "검색 완료"), ("Backspace", "지우기")],
        View::Nutrition => &[("/", "검색"), ("Enter", "상세"), ("↑/↓", "이동")],
        View::Prices if app.price_section == PriceSection::Search => &[
            ("←/→", "섹션"),
            ("c", "분류"),
            ("n", "과일"),
            ("s", "정렬"),
        ],
        View::Prices => &[("←/→", "섹션"), ("↑/↓", "분류 선택"), ("Enter", "상세")],
        View::Recommendations => &[("↑/↓", "항목"), ("←/→", "값 변경"), ("Enter", "추천받기")],
    };

    if let Some(message) = &app.status {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Red)));
    }

    for (key, label) in hints {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {}", label)));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

// ============================================================================
// HOME
// ============================================================================

fn render_home(f: &mut Frame, area: Rect, app: &App) {
    let home = HomeSummary::build(&app.records, app.month);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(8)])
        .split(area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} ({})", home.headline(), home.season.label()),
            title_style(),
        )),
        Line::from(""),
    ];

    for featured in &home.featured {
        let record = &featured.record;
        let image = app.images.resolve(&record.name, Some(&record.kind));
        let calories = featured
            .info
            .map(|i| format!("{} kcal/100g", i.calories))
            .unwrap_or_else(|| NO_DATA.to_string());

        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                record.label(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(image_label(&image), Style::default().fg(Color::DarkGray)),
        ]));
        content.push(Line::from(vec![
            Span::raw("    💰 가격: "),
            Span::styled(record.price_display(), Style::default().fg(Color::Green)),
            Span::raw("   🔥 칼로리: "),
            Span::raw(calories),
        ]));
        content.push(Line::from(vec![
            Span::raw("    ✨ "),
            Span::styled(featured.highlight(), Style::default().fg(Color::White)),
        ]));
        content.push(Line::from(""));
    }

    let featured = Paragraph::new(content)
        .block(bordered(" 이달의 제철 과일 ".to_string(), Color::White));
    f.render_widget(featured, chunks[0]);

    let mut tips = vec![];
    for (title, body) in HOME_TIPS {
        tips.push(Line::from(Span::styled(format!("  {}", title), title_style())));
        tips.push(Line::from(format!("  {}", body)));
        tips.push(Line::from(""));
    }
    let tips = Paragraph::new(tips)
        .wrap(Wrap { trim: false })
        .block(bordered(" 건강한 과일 섭취 팁 ".to_string(), Color::White));
    f.render_widget(tips, chunks[1]);
}

// ============================================================================
// NUTRITION
// ============================================================================

fn render_nutrition(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search_style = if app.search_mode {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let search = Paragraph::new(Line::from(vec![
        Span::raw(" 🔍 "),
        Span::styled(app.search_term.clone(), search_style),
        if app.search_mode {
            Span::styled("_", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("")
        },
    ]))
    .block(bordered(" 과일 이름 검색 ".to_string(), Color::White));
    f.render_widget(search, chunks[0]);

    let body = if app.detail.is_some() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(chunks[1])
    };

    render_fruit_list(f, body[0], app);
    if let Some(detail) = &app.detail {
        render_fruit_detail(f, body[1], detail, &app.images);
    }
}

fn render_fruit_list(f: &mut Frame, area: Rect, app: &mut App) {
    let names: Vec<String> = app.filtered_names().into_iter().cloned().collect();

    if names.is_empty() {
        let empty = Paragraph::new("  검색 결과가 없습니다. 다른 검색어를 입력해 보세요.")
            .block(bordered(" 과일 목록 ".to_string(), Color::White));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = names
        .iter()
        .map(|name| {
            let info = app.nutrition.lookup(name);
            let (kind, price) = match app.first_variety(name) {
                Some(record) => (record.kind.clone(), record.price_display()),
                None => (NO_DATA.to_string(), NO_DATA.to_string()),
            };
            Row::new(vec![
                Cell::from(name.clone()),
                Cell::from(categorize(name).label()),
                Cell::from(info.calories_display()),
                Cell::from(info.sweetness_display()),
                Cell::from(price),
                Cell::from(truncate(&kind, 14)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(16),
        ],
    )
    .header(header_row(&["과일", "분류", "칼로리", "당도", "가격", "품종"]))
    .block(bordered(format!(" 과일 목록 ({}) ", names.len()), Color::White))
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.list_state);
}

fn render_fruit_detail(f: &mut Frame, area: Rect, detail: &FruitDetail, images: &ImageResolver) {
    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    let image = images.resolve(&detail.name, None);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {}", detail.name),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(image_label(&image), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(vec![label("  분류: "), Span::raw(categorize(&detail.name).label())]),
        Line::from(vec![label("  칼로리: "), Span::raw(detail.nutrition.calories_display())]),
        Line::from(vec![label("  당도: "), Span::raw(detail.nutrition.sweetness_display())]),
        Line::from(vec![label("  주요 원산지: "), Span::raw(detail.nutrition.origin.clone())]),
        Line::from(vec![label("  재배 시기: "), Span::raw(detail.nutrition.season.clone())]),
        Line::from(vec![label("  평균 가격: "), Span::raw(detail.avg_price_display())]),
        Line::from(vec![label("  최저 가격: "), Span::raw(detail.min_price_display())]),
        Line::from(vec![label("  품종 수: "), Span::raw(detail.variety_count.to_string())]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(Span::styled(
            "  품종별 가격",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    for variety in &detail.varieties {
        content.push(Line::from(vec![
            Span::raw(format!("  {:<16}", truncate(&variety.kind, 16))),
            Span::styled(variety.price_display(), Style::default().fg(Color::Green)),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Enter: 목록으로 돌아가기",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let panel = Paragraph::new(content)
        .block(bordered(" 상세 정보 ".to_string(), Color::Yellow));
    f.render_widget(panel, area);
}

// ============================================================================
// PRICES
// ============================================================================

fn render_prices(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_market_summary(f, chunks[0], app);

    match app.price_section {
        PriceSection::Overview => render_category_overview(f, chunks[1], app),
        PriceSection::Detail => render_category_detail(f, chunks[1], app),
        PriceSection::Seasonal => render_seasonal(f, chunks[1], app),
        PriceSection::Search => render_price_search(f, chunks[1], app),
        PriceSection::Cheapest => render_cheapest(f, chunks[1], app),
    }
}

fn render_market_summary(f: &mut Frame, area: Rect, app: &App) {
    let mut sections = vec![];
    for (i, section) in PriceSection::ALL.iter().enumerate() {
        if i > 0 {
            sections.push(Span::raw(" · "));
        }
        let style = if *section == app.price_section {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        sections.push(Span::styled(section.title(), style));
    }

    let stats = match analytics::market_summary(&app.priced) {
        Some(s) => Line::from(vec![
            Span::raw(" 분류 "),
            Span::styled(format!("{}개", s.category_count), title_style()),
            Span::raw("  |  총 과일 "),
            Span::styled(format!("{}개", s.total_fruits), title_style()),
            Span::raw("  |  평균 가격 "),
            Span::styled(won(s.mean_price), title_style()),
            Span::raw("  |  가격 범위 "),
            Span::styled(won(s.price_range), title_style()),
        ]),
        None => Line::from(Span::styled(
            format!(" 가격 {}", NO_DATA),
            Style::default().fg(Color::DarkGray),
        )),
    };

    let summary = Paragraph::new(vec![Line::from(sections), stats])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));
    f.render_widget(summary, area);
}

fn render_category_overview(f: &mut Frame, area: Rect, app: &mut App) {
    let overview = analytics::category_overview(&app.priced);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let rows: Vec<Row> = overview
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(c.category.label()),
                Cell::from(c.stats.count.to_string()),
                Cell::from(won(c.stats.mean)),
                Cell::from(won(c.stats.min)),
                Cell::from(won(c.stats.max)),
                Cell::from(
                    c.stats
                        .std_dev
                        .map(won)
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["분류", "개수", "평균", "최저", "최고", "표준편차"]))
    .block(bordered(" 분류별 평균 가격 ".to_string(), Color::White))
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[0], &mut app.overview_state);

    let legend: Vec<Line> = overview
        .iter()
        .flat_map(|c| {
            vec![
                Line::from(Span::styled(format!(" {}", c.category.label()), title_style())),
                Line::from(format!("   {}", c.category.description())),
            ]
        })
        .collect();
    let legend = Paragraph::new(legend)
        .wrap(Wrap { trim: false })
        .block(bordered(" 분류 설명 ".to_string(), Color::White));
    f.render_widget(legend, chunks[1]);
}

fn render_category_detail(f: &mut Frame, area: Rect, app: &App) {
    let detail = app
        .selected_category()
        .and_then(|category| analytics::category_detail(&app.priced, category));

    let detail = match detail {
        Some(d) => d,
        None => {
            let empty = Paragraph::new(format!("  {}", NO_RESULTS))
                .block(bordered(" 분류 상세 ".to_string(), Color::Yellow));
            f.render_widget(empty, area);
            return;
        }
    };

    let rows: Vec<Row> = detail
        .entries
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(format!("{}/{}", entry.rank, entry.total)),
                Cell::from(truncate(&entry.record.label(), 24)),
                Cell::from(entry.record.price_display()),
                Cell::from(signed_won(entry.delta_from_category))
                    .style(Style::default().fg(delta_color(entry.delta_from_category))),
                Cell::from(signed_won(entry.delta_from_overall))
                    .style(Style::default().fg(delta_color(entry.delta_from_overall))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(26),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["순위", "과일", "가격", "분류 평균 대비", "전체 평균 대비"]))
    .block(bordered(
        format!(
            " {} - 평균 {} · 최저 {} · 최고 {} ",
            detail.category.label(),
            won(detail.stats.mean),
            won(detail.stats.min),
            won(detail.stats.max)
        ),
        Color::Yellow,
    ));

    f.render_widget(table, area);
}

fn render_seasonal(f: &mut Frame, area: Rect, app: &App) {
    let ranking = analytics::seasonal_category_ranking(&app.samples, 3);

    let rows: Vec<Row> = ranking
        .iter()
        .map(|(season, ranked)| {
            let mut cells = vec![Cell::from(season.label())];
            for i in 0..3 {
                cells.push(match ranked.get(i) {
                    Some((category, mean)) => {
                        Cell::from(format!("{} {}", category.label(), won(*mean)))
                    }
                    None => Cell::from("-"),
                });
            }
            Row::new(cells)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(20),
        ],
    )
    .header(header_row(&["계절", "1위", "2위", "3위"]))
    .block(bordered(
        " 계절별 가격이 높은 분류 (모의 데이터) ".to_string(),
        Color::White,
    ));

    f.render_widget(table, area);
}

fn render_price_search(f: &mut Frame, area: Rect, app: &App) {
    let result = analytics::search(&app.priced, &app.filter);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let filter_line = Line::from(vec![
        Span::raw(" 분류: "),
        Span::styled(
            app.filter.category.map(|c| c.label()).unwrap_or("전체"),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  |  과일: "),
        Span::styled(
            app.filter.name.clone().unwrap_or_else(|| "전체".to_string()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  |  정렬: "),
        Span::styled(app.filter.order.label(), Style::default().fg(Color::Yellow)),
    ]);
    let stats_line = match &result.stats {
        Some(s) => Line::from(format!(
            " {}개 · 평균 {} · 최저 {} · 최고 {}",
            s.count,
            won(s.mean),
            won(s.min),
            won(s.max)
        )),
        None => Line::from(""),
    };
    let filters = Paragraph::new(vec![filter_line, stats_line])
        .block(bordered(" 검색 조건 ".to_string(), Color::White));
    f.render_widget(filters, chunks[0]);

    if result.is_empty() {
        let empty = Paragraph::new(format!("  {}", NO_RESULTS))
            .block(bordered(" 검색 결과 ".to_string(), Color::White));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let rows: Vec<Row> = result
        .entries
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.record.name.clone()),
                Cell::from(truncate(&entry.record.kind, 18)),
                Cell::from(entry.category.label()),
                Cell::from(entry.record.price_display()),
                Cell::from(signed_won(entry.delta_from_overall))
                    .style(Style::default().fg(delta_color(entry.delta_from_overall))),
                Cell::from(format!("{}/{}", entry.rank, entry.total)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["과일", "품종", "분류", "가격", "전체 평균 대비", "전체 순위"]))
    .block(bordered(
        format!(" 검색 결과 ({}) ", result.entries.len()),
        Color::White,
    ));

    f.render_widget(table, chunks[1]);
}

fn render_cheapest(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mut per_category = vec![];
    for (category, records) in analytics::cheapest_per_category(&app.priced, 3) {
        per_category.push(Line::from(Span::styled(
            format!(" {}", category.label()),
            title_style(),
        )));
        for (i, record) in records.iter().enumerate() {
            per_category.push(Line::from(vec![
                Span::raw(format!("   {}. {:<20}", i + 1, truncate(&record.label(), 20))),
                Span::styled(record.price_display(), Style::default().fg(Color::Green)),
            ]));
        }
    }
    let per_category = Paragraph::new(per_category)
        .block(bordered(" 분류별 최저가 TOP 3 ".to_string(), Color::White));
    f.render_widget(per_category, chunks[0]);

    let rows: Vec<Row> = analytics::cheapest(&app.priced, 5)
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Row::new(vec![
                Cell::from(format!("#{}", i + 1)),
                Cell::from(truncate(&record.label(), 22)),
                Cell::from(categorize(&record.name).label()),
                Cell::from(record.price_display()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(24),
            Constraint::Length(10),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["순위", "과일", "분류", "가격"]))
    .block(bordered(" 전체 최저가 TOP 5 ".to_string(), Color::White));
    f.render_widget(table, chunks[1]);
}

// ============================================================================
// RECOMMENDATIONS
// ============================================================================

fn render_recommendations(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let field = |field: FormField, name: &'static str, value: &'static str| {
        let focused = app.form.focus == field;
        Line::from(vec![
            Span::raw(if focused { "  → " } else { "    " }),
            Span::styled(name, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("  ◀ "),
            Span::styled(
                value,
                if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                },
            ),
            Span::raw(" ▶"),
        ])
    };

    let form = Paragraph::new(vec![
        Line::from(""),
        field(FormField::Goal, "🎯 건강 목표    ", app.form.goal.label()),
        field(FormField::Age, "👥 연령대       ", app.form.age.label()),
        field(FormField::Condition, "🚻 성별/특수상황", app.form.condition.label()),
    ])
    .block(bordered(" 📝 개인 정보 입력 ".to_string(), Color::White));
    f.render_widget(form, chunks[0]);

    let rec = match &app.recommendation {
        Some(rec) => rec,
        None => {
            let hint = Paragraph::new("  Enter 를 눌러 맞춤 과일 추천을 받아보세요.")
                .block(bordered(" 🏆 추천 결과 ".to_string(), Color::White));
            f.render_widget(hint, chunks[1]);
            return;
        }
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let mut fruits = vec![
        Line::from(""),
        Line::from(format!(
            "  {}, {}, {} 조건을 종합한 추천",
            rec.goal.label(),
            rec.age.label(),
            rec.condition.label()
        )),
        Line::from(""),
    ];
    for fruit in rec.top(app.display_limit) {
        let image = app.images.resolve(fruit, None);
        fruits.push(Line::from(vec![
            Span::styled(
                format!("  {:<8}", fruit),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(image_label(&image), Style::default().fg(Color::DarkGray)),
        ]));
    }
    let fruits = Paragraph::new(fruits)
        .block(bordered(" 🏆 맞춤 추천 과일 ".to_string(), Color::Green));
    f.render_widget(fruits, body[0]);

    let mut reasons = vec![];
    for (key, profile) in rec.reasons() {
        reasons.push(Line::from(Span::styled(format!(" {}", key), title_style())));
        reasons.push(Line::from(format!("   {}", profile.reason)));
        reasons.push(Line::from(format!(
            "   주요 영양소: {}",
            profile.nutrients.join(", ")
        )));
        reasons.push(Line::from(""));
    }
    reasons.push(Line::from(Span::styled(
        format!(" 🍎 {} 을 위한 섭취 가이드", rec.goal.label()),
        title_style(),
    )));
    for tip in EATING_TIPS {
        reasons.push(Line::from(format!("   - {}", tip)));
    }

    let reasons = Paragraph::new(reasons)
        .wrap(Wrap { trim: false })
        .block(bordered(" 💡 추천 이유 ".to_string(), Color::White));
    f.render_widget(reasons, body[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruit_dashboard::analytics::SortOrder;

    fn app() -> App {
        let records = vec![
            FruitRecord::new("사과", "홍로", Some(1200.0)),
            FruitRecord::new("사과", "후지", Some(900.0)),
            FruitRecord::new("배", "신고", Some(1500.0)),
            FruitRecord::new("딸기", "설향", Some(2100.0)),
            FruitRecord::new("수박", "일반", None),
        ];
        let samples = TrendSimulator::with_seed(1).simulate(&records);
        let names = ["사과", "배", "딸기", "수박"].map(String::from).to_vec();
        App::from_parts(
            Catalog::new("/nonexistent/fruit-dashboard/catalog.sqlite3"),
            records,
            names,
            samples,
            NutritionTable::default(),
            ImageResolver::new("/nonexistent/fruit-dashboard/images"),
            5,
        )
    }

    #[test]
    fn test_navigation_resets_page_state() {
        let mut app = app();
        app.current_view = View::Nutrition;
        app.push_search_char('사');
        app.price_section = PriceSection::Seasonal;

        app.next_view();
        assert_eq!(app.current_view, View::Prices);
        assert!(app.search_term.is_empty());
        assert_eq!(app.price_section, PriceSection::Overview);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_search_narrows_fruit_list() {
        let mut app = app();
        assert_eq!(app.fruit_names, vec!["사과", "배", "딸기", "수박"]);

        app.push_search_char('딸');
        assert_eq!(app.filtered_names(), vec!["딸기"]);

        app.push_search_char('x');
        assert!(app.filtered_names().is_empty());
        assert_eq!(app.list_state.selected(), None);

        app.pop_search_char();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_detail_on_missing_store_stays_closed() {
        let mut app = app();
        app.current_view = View::Nutrition;
        app.toggle_detail();
        assert!(app.detail.is_none());
        assert!(app.status.as_deref().is_some_and(|s| s.starts_with("사과")));

        app.next_view();
        assert!(app.status.is_none());
    }

    #[test]
    fn test_selection_wraps_in_overview() {
        let mut app = app();
        app.current_view = View::Prices;
        // 취합과, 이과
        assert_eq!(app.selected_category(), Some(BotanicalCategory::Aggregate));
        app.next();
        assert_eq!(app.selected_category(), Some(BotanicalCategory::Pome));
        app.next();
        assert_eq!(app.selected_category(), Some(BotanicalCategory::Aggregate));
        app.previous();
        assert_eq!(app.selected_category(), Some(BotanicalCategory::Pome));
    }

    #[test]
    fn test_search_filter_cycling() {
        let mut app = app();
        app.cycle_filter_category();
        assert_eq!(app.filter.category, Some(BotanicalCategory::Pome));

        app.cycle_filter_name();
        assert_eq!(app.filter.name.as_deref(), Some("사과"));
        app.cycle_filter_name();
        assert_eq!(app.filter.name.as_deref(), Some("배"));
        app.cycle_filter_name();
        assert_eq!(app.filter.name, None);

        app.cycle_sort_order();
        assert_eq!(app.filter.order, SortOrder::PriceDesc);
    }

    #[test]
    fn test_form_submission() {
        let mut app = app();
        app.current_view = View::Recommendations;
        app.form.change_value(true);
        app.next();
        app.form.change_value(false);
        app.submit_form();

        let rec = app.recommendation.as_ref().unwrap();
        assert_eq!(rec.goal, HealthGoal::Immunity);
        assert_eq!(rec.age, AgeGroup::Senior);
        assert_eq!(rec.condition, Condition::Male);
    }

    #[test]
    fn test_load_lists_distinct_names_from_catalog() {
        let path = std::env::temp_dir().join("fruit_dashboard_ui_load.sqlite3");
        std::fs::remove_file(&path).ok();
        let conn = rusqlite::Connection::open(&path).unwrap();
        fruit_dashboard::setup_database(&conn).unwrap();
        fruit_dashboard::insert_fruits(
            &conn,
            &[
                FruitRecord::new("배", "신고", Some(1500.0)),
                FruitRecord::new("사과", "홍로", Some(1200.0)),
                FruitRecord::new("배", "원황", Some(1400.0)),
            ],
        )
        .unwrap();
        drop(conn);

        let config = AppConfig {
            db_path: path.clone(),
            nutrition_path: "/nonexistent/fruit-dashboard/data.json".into(),
            ..Default::default()
        };
        let app = App::load(&config, 4);
        assert!(app.empty_state.is_none());
        assert_eq!(app.records.len(), 3);
        assert_eq!(app.fruit_names, vec!["배", "사과"]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("샤인머스캣", 10), "샤인머스캣");
        assert_eq!(truncate("아주아주긴품종이름", 6), "아주아...");
    }
}
