use futures::stream;
use lens_stream::{MarkdownRenderer, Render, assemble};
use lens_types::FinishReason;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

const ANSWER: &str = "Your concern about **sodium** is reasonable.\n\n\
Several trials found modest effects [12345678](https://pubmed.ncbi.nlm.nih.gov/12345678/), \
[87654321](https://pubmed.ncbi.nlm.nih.gov/87654321/).\n\n\
| guideline | limit |\n|---|---|\n| FDA | 2300 mg |\n\n\
- [x] reduce processed food\n- [ ] ~~ignore labels~~\n\n```text\nnote\n```\n";

/// Cut the answer into small deltas, on char boundaries.
fn deltas(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

fn sse_body(deltas: &[String]) -> String {
    let mut body: String = deltas
        .iter()
        .map(|d| format!("data: {}\n\n", serde_json::json!({ "text": d })))
        .collect();
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn every_partial_document_renders() {
    let body = sse_body(&deltas(ANSWER, 3));
    // Deliver in 7-byte pieces, straddling frames and separators.
    let pieces: Vec<Result<Vec<u8>, String>> =
        body.as_bytes().chunks(7).map(|c| Ok(c.to_vec())).collect();

    let mut markdown = MarkdownRenderer::new();
    let mut last_len = 0;
    let mut grew_monotonically = true;
    let mut renderer = |doc: &str| {
        grew_monotonically &= doc.len() > last_len;
        last_len = doc.len();
        markdown.render(doc);
    };

    let finish = assemble(stream::iter(pieces), &mut renderer, &CancellationToken::new()).await;

    assert!(grew_monotonically);
    assert_eq!(finish.reason, FinishReason::Done);
    assert_eq!(finish.document, ANSWER);
    assert_eq!(markdown.renders(), deltas(ANSWER, 3).len());
    assert!(markdown.html().contains("<table>"));
    assert!(markdown.html().contains("<del>ignore labels</del>"));
    assert!(markdown.html().contains("<strong>sodium</strong>"));
}

proptest! {
    #[test]
    fn any_prefix_of_markdown_renders(cut in 0usize..ANSWER.len()) {
        let mut end = cut;
        while !ANSWER.is_char_boundary(end) {
            end -= 1;
        }
        let renderer = MarkdownRenderer::new();
        let html = renderer.to_html(&ANSWER[..end]);
        prop_assert!(end == 0 || !html.is_empty());
    }

    #[test]
    fn arbitrary_text_renders(doc in any::<String>()) {
        let mut renderer = MarkdownRenderer::new();
        renderer.render(&doc);
        prop_assert_eq!(renderer.renders(), 1);
    }
}
