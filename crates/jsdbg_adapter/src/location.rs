/// Translates between frontend coordinates (local paths, client line/column
/// base) and remote ones (module URLs, 0-based positions).
#[derive(Debug, Clone)]
pub struct LocationMapper {
    work_dir: String,
    lines_start_at1: bool,
    columns_start_at1: bool,
}

impl Default for LocationMapper {
    fn default() -> Self {
        Self {
            work_dir: String::new(),
            lines_start_at1: true,
            columns_start_at1: true,
        }
    }
}

impl LocationMapper {
    pub fn set_work_dir(&mut self, work_dir: impl Into<String>) {
        self.work_dir = work_dir.into();
    }

    pub fn set_client_bases(&mut self, lines_start_at1: bool, columns_start_at1: bool) {
        self.lines_start_at1 = lines_start_at1;
        self.columns_start_at1 = columns_start_at1;
    }

    pub fn url_to_local(&self, url: &str) -> String {
        let path = url_path(url);
        if self.work_dir.is_empty() {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.work_dir.trim_end_matches(['/', '\\']),
            path.trim_start_matches('/')
        )
    }

    pub fn local_to_url(&self, local: &str) -> String {
        let work_dir = self.work_dir.trim_end_matches(['/', '\\']);
        let relative = if work_dir.is_empty() {
            local
        } else {
            local
                .strip_prefix(work_dir)
                .filter(|rest| rest.is_empty() || rest.starts_with(['/', '\\']))
                .unwrap_or(local)
        };

        let relative = relative.replace('\\', "/");
        if relative.starts_with('/') {
            relative
        } else {
            format!("/{relative}")
        }
    }

    pub fn line_to_client(&self, line: u32) -> i64 {
        i64::from(line) + offset(self.lines_start_at1)
    }

    pub fn column_to_client(&self, column: u32) -> i64 {
        i64::from(column) + offset(self.columns_start_at1)
    }

    pub fn line_to_remote(&self, line: i64) -> u32 {
        to_remote(line, self.lines_start_at1)
    }

    /// A breakpoint without a column targets the start of the line.
    pub fn column_to_remote(&self, column: Option<i64>) -> u32 {
        column
            .map(|c| to_remote(c, self.columns_start_at1))
            .unwrap_or(0)
    }
}

fn offset(starts_at1: bool) -> i64 {
    if starts_at1 {
        1
    } else {
        0
    }
}

fn to_remote(value: i64, starts_at1: bool) -> u32 {
    u32::try_from(value - offset(starts_at1)).unwrap_or(0)
}

/// Path component of a module URL; plain paths pass through unchanged.
fn url_path(url: &str) -> &str {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    };
    path.split(['?', '#']).next().unwrap_or(path)
}
