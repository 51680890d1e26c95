//! Colored console format for local development.

use nu_ansi_term::{Color, Style};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

pub struct PrettyConsoleLogFormat;

macro_rules! styled {
    ($writer:expr, $style:expr, $($arg:tt)*) => {{
        let style = $style;
        write!($writer, "{}", style.prefix())?;
        write!($writer, $($arg)*)?;
        write!($writer, "{}", style.suffix())?;
    }};
}

fn level_style(level: &Level) -> Style {
    match *level {
        Level::TRACE => Style::new().fg(Color::Purple),
        Level::DEBUG => Style::new().fg(Color::Blue),
        Level::INFO => Style::new().fg(Color::Green),
        Level::WARN => Style::new().fg(Color::Yellow),
        Level::ERROR => Style::new().fg(Color::Red).bold(),
    }
}

impl<S, N> FormatEvent<S, N> for PrettyConsoleLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        styled!(
            writer,
            Style::new().dimmed(),
            "{} ",
            chrono::Local::now().format("%T%.3f")
        );
        styled!(writer, level_style(metadata.level()), "{:<5}", metadata.level());

        let depth = ctx.event_scope().map(|scope| scope.count()).unwrap_or(0);
        styled!(writer, Style::new().fg(Color::Magenta), " {} ", "|".repeat(depth));
        styled!(writer, Style::new().dimmed(), "{}: ", metadata.target());

        let mut fields = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut fields), event)?;

        // Span creation events (FmtSpan::NEW) only carry "new"; show the span instead.
        if metadata.is_span()
            && fields == "new"
            && let Some(span) = ctx.event_scope().and_then(|mut scope| scope.next())
        {
            styled!(writer, Style::new().fg(Color::Magenta), "=> ");
            write!(writer, "{}", span.name())?;

            let ext = span.extensions();
            if let Some(span_fields) = ext.get::<FormattedFields<N>>()
                && !span_fields.is_empty()
            {
                write!(writer, "{{{}}}", span_fields)?;
            }
        } else {
            write!(writer, "{}", fields)?;
        }

        writeln!(writer)
    }
}
