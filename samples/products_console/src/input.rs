use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::runtime::Handle;
use tokio::sync::Mutex;

/// Input lines shared by the prompt loop and the delete confirmation, so both
/// read from the same buffer.
pub struct Input<R>(Arc<Mutex<Lines<R>>>);

pub type StdinInput = Input<BufReader<Stdin>>;

impl StdinInput {
    pub fn stdin() -> Self {
        Input::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> Input<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Input(Arc::new(Mutex::new(reader.lines())))
    }

    /// The next line, `None` at the end of input.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.0.lock().await.next_line().await
    }

    /// Same as [Input::next_line] for synchronous callers running inside the
    /// multi-threaded runtime.
    pub fn next_line_blocking(&self) -> std::io::Result<Option<String>> {
        tokio::task::block_in_place(|| Handle::current().block_on(self.next_line()))
    }
}

impl<R> Clone for Input<R> {
    fn clone(&self) -> Self {
        Input(self.0.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn shared_lines_test() {
        let input = Input::new(&b"delete 1\ny\nquit\n"[..]);
        let confirm = input.clone();

        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("delete 1"));
        assert_eq!(confirm.next_line_blocking().unwrap().as_deref(), Some("y"));
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("quit"));
        assert_eq!(input.next_line().await.unwrap(), None);
    }
}
