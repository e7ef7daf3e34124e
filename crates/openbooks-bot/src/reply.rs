//! Texts the bot sends back.

use openbooks_core::BookRecord;

pub const WELCOME: &str = "Olá! Sou o bot do OpenLibraryFREE 📚\n\n\
Me envie o nome de um livro, autor ou assunto, e eu buscarei para você em domínio público!\n\n\
Exemplo: 'Machado de Assis', 'Dom Casmurro'";

pub const NO_RESULTS: &str = "Nenhum livro encontrado para essa busca. Tente outros termos.";

pub const SEARCH_FAILED: &str = "Ocorreu um erro ao buscar os livros. Tente novamente mais tarde.";

/// What an incoming text asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request<'a> {
    Help,
    Search(&'a str),
    Ignore,
}

impl<'a> Request<'a> {
    pub fn parse(text: &'a str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Ignore;
        }
        // "/start@SomeBot" in group chats.
        let command = text
            .split_whitespace()
            .next()
            .and_then(|word| word.strip_prefix('/'))
            .map(|word| word.split('@').next().unwrap_or(word));
        match command {
            Some("start") | Some("help") => Self::Help,
            _ => Self::Search(text),
        }
    }
}

pub fn searching(query: &str) -> String {
    format!("🔍 Buscando por '{query}'... aguarde um instante.")
}

/// Markdown list of the first `max` books.
pub fn results(query: &str, books: &[BookRecord], max: usize) -> String {
    let mut text = format!("📚 *Resultados para '{}':*\n\n", escape_markdown(query));
    for (i, book) in books.iter().take(max).enumerate() {
        text.push_str(&format!("*{}. {}*\n", i + 1, escape_markdown(&book.title)));
        text.push_str(&format!("👤 Autor: {}\n", escape_markdown(&book.author)));
        text.push_str(&format!("📖 Fonte: {}\n", escape_markdown(&book.source)));
        if let Some(url) = &book.download_url {
            text.push_str(&format!("⬇️ [Baixar Livro]({url})\n"));
        } else if let Some(url) = &book.preview_url {
            text.push_str(&format!("👀 [Ler Online]({url})\n"));
        }
        text.push('\n');
    }
    text
}

/// Escape the characters legacy Markdown treats as markup.
pub fn escape_markdown(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Request::parse("/start"), Request::Help);
        assert_eq!(Request::parse("/help@OpenBooksBot"), Request::Help);
        assert_eq!(Request::parse("  Dom Casmurro "), Request::Search("Dom Casmurro"));
        assert_eq!(Request::parse("   "), Request::Ignore);
    }

    #[test]
    fn test_progress_text_quotes_query() {
        assert_eq!(
            searching("Iracema"),
            "🔍 Buscando por 'Iracema'... aguarde um instante."
        );
    }

    #[test]
    fn test_results_prefer_download_link() {
        let books = vec![
            BookRecord::new("gutenberg_1", "Dom Casmurro", "Project Gutenberg")
                .with_author("Machado de Assis")
                .with_links(
                    Some("https://gutenberg.org/1.epub".to_string()),
                    Some("https://gutenberg.org/1.html".to_string()),
                ),
            BookRecord::new("ol_OL1W", "snake_case_title", "Open Library")
                .with_links(None, Some("https://openlibrary.org/works/OL1W".to_string())),
        ];
        let text = results("machado", &books, 5);
        assert!(text.starts_with("📚 *Resultados para 'machado':*"));
        assert!(text.contains("*1. Dom Casmurro*"));
        assert!(text.contains("⬇️ [Baixar Livro](https://gutenberg.org/1.epub)"));
        assert!(!text.contains("1.html"));
        assert!(text.contains("*2. snake\\_case\\_title*"));
        assert!(text.contains("👤 Autor: Unknown Author"));
        assert!(text.contains("👀 [Ler Online](https://openlibrary.org/works/OL1W)"));
    }

    #[test]
    fn test_results_are_capped() {
        let books: Vec<BookRecord> = (0..8)
            .map(|i| BookRecord::new(format!("ia_{i}"), format!("Book {i}"), "Internet Archive"))
            .collect();
        let text = results("q", &books, 5);
        assert!(text.contains("*5. Book 4*"));
        assert!(!text.contains("Book 5"));
    }
}
