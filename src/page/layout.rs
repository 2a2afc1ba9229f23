use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::animations::{SectionReveal, Slide};
use crate::content::Portfolio;

/// Widest the content column gets, in cells.
pub const MAX_COLUMN: usize = 80;
/// Narrowest column that still gets a two-column press grid.
pub const GRID_MIN_WIDTH: usize = 48;
/// Press card height including its border.
pub const CARD_HEIGHT: usize = 6;
const NAME_COLUMN: usize = 24;
const AVATAR_WIDTH: usize = 8;
const AVATAR_HEIGHT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Header,
    Bio,
    Projects,
    Extra,
    Press,
    Contact,
    Socials,
    Footer,
}

impl SectionId {
    /// Sections fade in one after another as the page loads.
    pub fn reveal(self) -> SectionReveal {
        let delay = match self {
            SectionId::Header => 0.0,
            SectionId::Bio => 300.0,
            SectionId::Projects => 500.0,
            SectionId::Extra => 700.0,
            SectionId::Press => 900.0,
            SectionId::Contact => 1100.0,
            SectionId::Socials => 1300.0,
            SectionId::Footer => 1500.0,
        };
        let slide = match self {
            SectionId::Footer => Slide::FromBelow(2),
            _ => Slide::FromLeft(4),
        };
        SectionReveal::new(delay, slide)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Title,
    Heading,
    Body,
    Muted,
    Link,
    Rule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub col: usize,
    pub text: String,
    pub tone: Tone,
}

/// Text on one page row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub row: usize,
    pub section: SectionId,
    pub spans: Vec<Span>,
}

/// Cell rectangle in page coordinates (row 0 is the top of the page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub col: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.col && col < self.col + self.width && row >= self.row && row < self.row + self.height
    }

    /// The area inside a one-cell border.
    pub fn inner(&self) -> Rect {
        Rect {
            col: self.col + 1,
            row: self.row + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}

/// A wrapped line and the char offset in the source text where it begins.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapped {
    pub start: usize,
    pub text: String,
}

impl Wrapped {
    /// The part of this line covered by the first `revealed` source chars.
    pub fn revealed(&self, revealed: usize) -> &str {
        let n = revealed.saturating_sub(self.start);
        match self.text.char_indices().nth(n) {
            Some((i, _)) => &self.text[..i],
            None => &self.text,
        }
    }
}

/// Where the typed intro goes.
#[derive(Debug, Clone, PartialEq)]
pub struct IntroBlock {
    pub rect: Rect,
    pub lines: Vec<Wrapped>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub left: usize,
    pub width: usize,
    pub lines: Vec<Line>,
    /// Bordered press cards, in content order.
    pub cards: Vec<Rect>,
    pub intro: IntroBlock,
    pub height: usize,
}

struct Builder {
    left: usize,
    width: usize,
    row: usize,
    lines: Vec<Line>,
}

impl Builder {
    fn line(&mut self, section: SectionId, spans: Vec<Span>) {
        self.lines.push(Line {
            row: self.row,
            section,
            spans,
        });
        self.row += 1;
    }

    fn text(&mut self, section: SectionId, indent: usize, text: &str, tone: Tone) {
        for w in wrap(text, self.width.saturating_sub(indent)) {
            self.line(section, vec![self.span(indent, w.text, tone)]);
        }
    }

    fn heading(&mut self, section: SectionId, text: &str) {
        self.text(section, 0, text, Tone::Heading);
        self.gap(1);
    }

    fn span(&self, offset: usize, text: impl Into<String>, tone: Tone) -> Span {
        Span {
            col: self.left + offset,
            text: text.into(),
            tone,
        }
    }

    fn gap(&mut self, rows: usize) {
        self.row += rows;
    }
}

/// Lay the portfolio out for a terminal `term_cols` wide.
pub fn layout(p: &Portfolio, term_cols: usize) -> Layout {
    let width = term_cols.saturating_sub(4).clamp(1, MAX_COLUMN);
    let left = term_cols.saturating_sub(width) / 2;
    let mut b = Builder {
        left,
        width,
        row: 1,
        lines: Vec::new(),
    };

    header(&mut b, p);
    b.gap(2);
    let intro = intro(&mut b, p);
    b.gap(1);
    for (i, para) in p.bio.iter().enumerate() {
        if i > 0 {
            b.gap(1);
        }
        b.text(SectionId::Bio, 0, para, Tone::Body);
    }
    b.gap(1);
    b.line(SectionId::Bio, vec![b.span(0, "─".repeat(width), Tone::Rule)]);
    b.gap(1);

    b.heading(SectionId::Projects, &p.projects_heading);
    projects(&mut b, p);

    if let Some(extra) = &p.extra {
        b.gap(1);
        b.heading(SectionId::Extra, &extra.heading);
        b.text(SectionId::Extra, 0, &extra.body, Tone::Body);
    }

    b.gap(1);
    b.heading(SectionId::Press, &p.press_heading);
    let cards = press_grid(&mut b, p.press.len());

    b.gap(1);
    b.heading(SectionId::Contact, &p.contact.heading);
    contact(&mut b, p);

    b.gap(1);
    b.heading(SectionId::Socials, &p.socials_heading);
    socials(&mut b, p);

    b.gap(2);
    let footer = truncate(&p.footer, term_cols);
    let footer_col = term_cols.saturating_sub(footer.width()) / 2;
    b.lines.push(Line {
        row: b.row,
        section: SectionId::Footer,
        spans: vec![Span {
            col: footer_col,
            text: footer,
            tone: Tone::Muted,
        }],
    });
    b.row += 2;

    Layout {
        left,
        width,
        height: b.row,
        lines: b.lines,
        cards,
        intro,
    }
}

fn header(b: &mut Builder, p: &Portfolio) {
    let name = truncate(&p.name, b.width);
    let nav = p
        .nav
        .iter()
        .map(|l| l.label.as_str())
        .collect::<Vec<_>>()
        .join("  ");
    let nav_w = nav.width();
    if nav.is_empty() {
        b.line(SectionId::Header, vec![b.span(0, name, Tone::Title)]);
    } else if name.width() + 2 + nav_w <= b.width {
        let spans = vec![
            b.span(0, name, Tone::Title),
            b.span(b.width - nav_w, nav, Tone::Link),
        ];
        b.line(SectionId::Header, spans);
    } else {
        b.line(SectionId::Header, vec![b.span(0, name, Tone::Title)]);
        b.line(SectionId::Header, vec![b.span(0, truncate(&nav, b.width), Tone::Link)]);
    }
}

fn intro(b: &mut Builder, p: &Portfolio) -> IntroBlock {
    let top = b.row;
    let with_avatar = b.width >= AVATAR_WIDTH + 2 + 16;
    let text_offset = if with_avatar { AVATAR_WIDTH + 2 } else { 0 };
    let text_width = b.width - text_offset;
    let lines = wrap(&p.intro, text_width);
    let height = if with_avatar {
        lines.len().max(AVATAR_HEIGHT)
    } else {
        lines.len()
    };

    for i in 0..height {
        let spans = if with_avatar && i < AVATAR_HEIGHT {
            vec![b.span(0, avatar_row(&p.name, i), Tone::Muted)]
        } else {
            Vec::new()
        };
        b.line(SectionId::Bio, spans);
    }

    IntroBlock {
        rect: Rect {
            col: b.left + text_offset,
            row: top,
            width: text_width,
            height,
        },
        lines,
    }
}

/// One row of a boxed placeholder portrait showing the name's initials.
fn avatar_row(name: &str, row: usize) -> String {
    let inner = AVATAR_WIDTH - 2;
    match row {
        0 => format!("┌{}┐", "─".repeat(inner)),
        r if r == AVATAR_HEIGHT - 1 => format!("└{}┘", "─".repeat(inner)),
        1 => {
            let initials: String = name
                .split_whitespace()
                .filter_map(|w| w.chars().next())
                .take(3)
                .collect();
            let initials = truncate(&initials, inner);
            let pad = inner - initials.width();
            format!("│{}{}{}│", " ".repeat(pad / 2), initials, " ".repeat(pad - pad / 2))
        }
        _ => format!("│{}│", " ".repeat(inner)),
    }
}

fn projects(b: &mut Builder, p: &Portfolio) {
    let side_by_side = b.width >= GRID_MIN_WIDTH;
    for (i, project) in p.projects.iter().enumerate() {
        if i > 0 {
            b.gap(1);
        }
        let title = format!("{} ↗", project.name);
        let details = project.partnership.iter().chain(project.metric.iter());
        if side_by_side {
            let desc_width = b.width - NAME_COLUMN;
            let mut rows: Vec<(String, Tone)> = wrap(&project.description, desc_width)
                .into_iter()
                .map(|w| (w.text, Tone::Body))
                .collect();
            for detail in details {
                rows.extend(wrap(detail, desc_width).into_iter().map(|w| (w.text, Tone::Muted)));
            }
            for (r, (text, tone)) in rows.into_iter().enumerate() {
                let mut spans = Vec::new();
                if r == 0 {
                    spans.push(b.span(0, truncate(&title, NAME_COLUMN - 2), Tone::Heading));
                }
                spans.push(b.span(NAME_COLUMN, text, tone));
                b.line(SectionId::Projects, spans);
            }
        } else {
            b.text(SectionId::Projects, 0, &title, Tone::Heading);
            b.text(SectionId::Projects, 2, &project.description, Tone::Body);
            for detail in details {
                b.text(SectionId::Projects, 2, detail, Tone::Muted);
            }
        }
    }
}

fn press_grid(b: &mut Builder, count: usize) -> Vec<Rect> {
    let columns = if b.width >= GRID_MIN_WIDTH { 2 } else { 1 };
    let gap = 2;
    let card_width = (b.width - gap * (columns - 1)) / columns;
    let mut cards = Vec::with_capacity(count);
    for i in 0..count {
        let (grid_row, grid_col) = (i / columns, i % columns);
        if grid_col == 0 && grid_row > 0 {
            b.row += CARD_HEIGHT + 1;
        }
        cards.push(Rect {
            col: b.left + grid_col * (card_width + gap),
            row: b.row,
            width: card_width,
            height: CARD_HEIGHT,
        });
    }
    if count > 0 {
        b.row += CARD_HEIGHT;
    }
    cards
}

fn contact(b: &mut Builder, p: &Portfolio) {
    let blurb = &p.contact.blurb;
    let email = &p.contact.email;
    if blurb.width() + 1 + email.width() <= b.width {
        let spans = vec![
            b.span(0, blurb.clone(), Tone::Body),
            b.span(blurb.width() + 1, email.clone(), Tone::Link),
        ];
        b.line(SectionId::Contact, spans);
    } else {
        b.text(SectionId::Contact, 0, blurb, Tone::Body);
        b.line(SectionId::Contact, vec![b.span(0, truncate(email, b.width), Tone::Link)]);
    }
}

fn socials(b: &mut Builder, p: &Portfolio) {
    const PLATFORM_COLUMN: usize = 10;
    for social in &p.socials {
        let platform = truncate(&social.platform, PLATFORM_COLUMN - 1);
        let user = truncate(&social.username, b.width.saturating_sub(PLATFORM_COLUMN));
        let user_col = b.width - user.width();
        let mut spans = vec![b.span(0, platform, Tone::Body)];
        let leader = user_col.saturating_sub(PLATFORM_COLUMN + 1);
        if leader > 0 {
            spans.push(b.span(PLATFORM_COLUMN, "·".repeat(leader), Tone::Rule));
        }
        spans.push(b.span(user_col, user, Tone::Link));
        b.line(SectionId::Socials, spans);
    }
}

/// Cut to `width` cells, marking the cut with an ellipsis.
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut w = 0;
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if w + cw + 1 > width {
            break;
        }
        out.push(ch);
        w += cw;
    }
    if width > 0 {
        out.push('…');
    }
    out
}

/// Word-wrap to `width` cells. Newlines always break. Words wider than the
/// line are split. Each line remembers its char offset in `text`.
pub fn wrap(text: &str, width: usize) -> Vec<Wrapped> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut base = 0;
    for para in text.split('\n') {
        wrap_paragraph(para, base, width, &mut out);
        base += para.chars().count() + 1;
    }
    out
}

fn wrap_paragraph(para: &str, base: usize, width: usize, out: &mut Vec<Wrapped>) {
    let mut line = String::new();
    let mut line_start = base;
    let mut line_w = 0;
    let mut offset = base;

    for word in para.split(' ') {
        let word_chars = word.chars().count();
        let word_w = word.width();
        if !line.is_empty() && line_w + 1 + word_w <= width {
            line.push(' ');
            line.push_str(word);
            line_w += 1 + word_w;
        } else {
            if !line.is_empty() {
                out.push(Wrapped {
                    start: line_start,
                    text: std::mem::take(&mut line),
                });
            }
            line_w = 0;
            // Split words that cannot fit on a line of their own.
            let mut chunk_start = offset;
            for ch in word.chars() {
                let cw = ch.width().unwrap_or(0);
                if line_w + cw > width && !line.is_empty() {
                    let chunk_len = line.chars().count();
                    out.push(Wrapped {
                        start: chunk_start,
                        text: std::mem::take(&mut line),
                    });
                    chunk_start += chunk_len;
                    line_w = 0;
                }
                line.push(ch);
                line_w += cw;
            }
            line_start = chunk_start;
        }
        offset += word_chars + 1;
    }
    out.push(Wrapped {
        start: line_start,
        text: line,
    });
}
