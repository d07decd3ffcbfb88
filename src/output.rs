use anyhow::{bail, Result};
use uuid::Uuid;

/// Ids are printed shortened; commands accept any unique prefix.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub struct TablePrinter {
    cols: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TablePrinter {
    pub fn new(cols: &[&str]) -> TablePrinter {
        TablePrinter {
            cols: cols.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, values: Vec<String>) -> Result<()> {
        if values.len() > self.cols.len() {
            bail!("Too many values");
        }

        self.rows.push(values);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let col_sizes: Vec<usize> = (0..self.cols.len())
            .map(|i| self.get_column_size(i))
            .collect();

        let mut buf = Vec::with_capacity(self.cols.len());
        for (i, c) in self.cols.iter().enumerate() {
            buf.push(format!("{:<1$}", c, col_sizes[i]))
        }
        println!("{}", buf.join("    ").trim_end());
        buf.clear();

        for r in self.rows.iter() {
            for (i, v) in r.iter().enumerate() {
                buf.push(format!("{:<1$}", v, col_sizes[i]));
            }

            println!("{}", buf.join("    ").trim_end());
            buf.clear();
        }
    }

    fn get_column_size(&self, col: usize) -> usize {
        self.rows
            .iter()
            .filter_map(|r| r.get(col))
            .map(|v| v.chars().count())
            .fold(self.cols[col].chars().count(), usize::max)
    }
}

pub fn print_section(title: &str, count: usize) {
    println!("\n{} ({})", title, count);
}
