use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

mod maze;
mod session;

use maze::{Dir, Grid, Pos};
use session::{Command, Mode, Session};

const DEFAULT_ROWS: usize = 15;
const DEFAULT_COLS: usize = 15;
const DEFAULT_RENDER_FPS: u64 = 30;
const CELL_W: usize = 2;
const TITLE: &str = "MAZE GAME GENERATOR";

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Wall,
    Open,
    Start,
    Goal,
    PathMark,
}

#[derive(Clone, Copy, PartialEq)]
struct CellImage {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    width: usize,
    height: usize,
    last: Vec<CellImage>,
    last_hud: String,
    last_notice: String,
    had_grid: bool,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![
                CellImage {
                    glyph: Glyph::Open,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_notice: String::new(),
            had_grid: false,
            needs_full: true,
            origin_x: 0,
            origin_y: 2,
        }
    }
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let (cols, rows, render_fps) = read_maze_settings();
    let mut session = Session::new(cols, rows, Instant::now());
    let mut renderer = Renderer::new(cols, rows);
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        let cmd = match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                            KeyCode::Char('g') => Some(Command::Generate),
                            KeyCode::Char('p') => Some(Command::Play),
                            KeyCode::Char('s') => Some(Command::Solution),
                            KeyCode::Up | KeyCode::Char('k') => Some(Command::Move(Dir::Up)),
                            KeyCode::Down | KeyCode::Char('j') => Some(Command::Move(Dir::Down)),
                            KeyCode::Left | KeyCode::Char('h') => Some(Command::Move(Dir::Left)),
                            KeyCode::Right | KeyCode::Char('l') => Some(Command::Move(Dir::Right)),
                            _ => None,
                        };
                        if let Some(cmd) = cmd {
                            session.apply(cmd, &mut rng, Instant::now());
                        }
                    }
                    _ => {}
                }
            }
        }

        session.tick(Instant::now());
        render(stdout, &session, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn read_maze_settings() -> (usize, usize, u64) {
    let cols = std::env::var("MAZE_COLS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map(make_odd)
        .filter(|v| *v >= 3)
        .unwrap_or(DEFAULT_COLS);
    let rows = std::env::var("MAZE_ROWS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .map(make_odd)
        .filter(|v| *v >= 3)
        .unwrap_or(DEFAULT_ROWS);
    let render_fps = std::env::var("MAZE_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    (cols, rows, render_fps)
}

// The stride-2 carve only reaches even coordinates, so even-sized grids
// would leave their last row and column solid wall.
fn make_odd(v: usize) -> usize {
    v | 1
}

fn render(stdout: &mut Stdout, session: &Session, renderer: &mut Renderer) -> io::Result<()> {
    let needed_h = (renderer.height + 4) as u16;
    let needed_w = ((renderer.width * CELL_W).max(TITLE.len() + 2)) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 2;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if session.grid.is_some() != renderer.had_grid {
        renderer.had_grid = session.grid.is_some();
        renderer.needs_full = true;
    }

    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 2))?;
        stdout.queue(SetForegroundColor(Color::Cyan))?;
        stdout.queue(Print(TITLE))?;
        stdout.queue(ResetColor)?;
    }

    let hud = format!(
        "[g] generate  [p] play  [s] solution  [q] quit   mode: {}",
        mode_label(session.mode)
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    match &session.grid {
        Some(grid) => {
            for y in 0..grid.height {
                for x in 0..grid.width {
                    let pos = Pos { x, y };
                    let cell = cell_for(session, grid, pos);
                    let idx = y * grid.width + x;
                    if renderer.needs_full || cell != renderer.last[idx] {
                        renderer.last[idx] = cell;
                        draw_cell(stdout, renderer, x, y, cell)?;
                    }
                }
            }
        }
        None => {
            if renderer.needs_full {
                let mid = renderer.origin_y + (renderer.height / 2) as u16;
                stdout.queue(MoveTo(renderer.origin_x, mid))?;
                stdout.queue(Print("Press g to generate a maze"))?;
            }
        }
    }

    let notice = session.notice().unwrap_or("");
    if renderer.needs_full || notice != renderer.last_notice {
        let line = renderer.origin_y + renderer.height as u16 + 1;
        stdout.queue(MoveTo(renderer.origin_x, line))?;
        stdout.queue(SetForegroundColor(Color::Yellow))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(notice))?;
        stdout.queue(ResetColor)?;
        renderer.last_notice = notice.to_string();
    }

    renderer.needs_full = false;
    stdout.flush()?;
    Ok(())
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Menu => "menu",
        Mode::Generate => "maze",
        Mode::Play => "play",
        Mode::Solution => "solution",
        Mode::Won => "won",
    }
}

fn cell_for(session: &Session, grid: &Grid, pos: Pos) -> CellImage {
    if pos == session.player {
        return CellImage {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if session.mode == Mode::Solution {
        if let Some(path) = &session.path {
            if path.contains(&pos) {
                return CellImage {
                    glyph: Glyph::PathMark,
                    color: Color::Cyan,
                };
            }
        }
    }
    if pos == grid.start() {
        return CellImage {
            glyph: Glyph::Start,
            color: Color::Green,
        };
    }
    if pos == grid.goal() {
        return CellImage {
            glyph: Glyph::Goal,
            color: Color::Red,
        };
    }
    if grid.is_open(pos) {
        CellImage {
            glyph: Glyph::Open,
            color: Color::Reset,
        }
    } else {
        CellImage {
            glyph: Glyph::Wall,
            color: Color::DarkBlue,
        }
    }
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: CellImage,
) -> io::Result<()> {
    let (text, color) = match cell.glyph {
        Glyph::Player => ("😃", cell.color),
        Glyph::Wall => ("██", cell.color),
        Glyph::Open => ("  ", cell.color),
        Glyph::Start => ("██", cell.color),
        Glyph::Goal => ("██", cell.color),
        Glyph::PathMark => ("██", cell.color),
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
