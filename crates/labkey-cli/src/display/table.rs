use super::InstanceResult;
use super::text::fit_cell;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;
use labkey_core::InstanceRegistry;
use serde_json::Value;

const MAX_CELL_WIDTH: usize = 60;

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text).add_attribute(Attribute::Bold)
        }
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width as u16);
        }
        table
    }

    pub fn render_servers(&self, registry: &InstanceRegistry) -> String {
        let mut table = self.new_table();
        table.set_header(
            ["#", "Host", "Project", "Schema", "Query", "Columns"]
                .iter()
                .map(|h| self.bold_header(h, Color::Cyan)),
        );

        for (index, config) in registry.configs().iter().enumerate() {
            table.add_row(vec![
                Cell::new(index),
                Cell::new(&config.host),
                Cell::new(&config.project),
                Cell::new(&config.schema),
                Cell::new(&config.query_name),
                Cell::new(fit_cell(&config.columns.join(", "), MAX_CELL_WIDTH)),
            ]);
        }

        table.to_string()
    }

    pub fn render_result(&self, result: &InstanceResult) -> String {
        let row_count = result
            .table
            .metadata()
            .row_count()
            .unwrap_or(result.table.len() as u64);
        let heading = format!("{} - {} row(s)", result.host, row_count);

        if result.table.columns().is_empty() {
            return format!("{}\nQuery returned no columns.", heading);
        }

        let mut table = self.new_table();
        table.set_header(
            result
                .table
                .columns()
                .iter()
                .map(|c| self.bold_header(c, Color::Green)),
        );

        for row in result.table.rows() {
            let cells: Vec<Cell> = row
                .values()
                .map(|value| {
                    let formatted = fit_cell(&self.format_cell_value(value), MAX_CELL_WIDTH);
                    if self.use_colors && value.is_null() {
                        Cell::new(formatted)
                            .fg(Color::DarkGrey)
                            .add_attribute(Attribute::Italic)
                    } else {
                        Cell::new(formatted)
                    }
                })
                .collect();
            table.add_row(cells);
        }

        format!("{}\n{}", heading, table)
    }

    pub fn format_cell_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "-".to_string(),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(arr) if arr.is_empty() => "[]".to_string(),
            Value::Array(arr) => format!("[{} items]", arr.len()),
            Value::Object(obj) if obj.is_empty() => "{}".to_string(),
            Value::Object(obj) => format!("{{{} items}}", obj.len()),
        }
    }
}
