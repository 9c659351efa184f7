//! A runtime fed by the `fastcgi` crate
//!
//! `fastcgi::run` owns the listening socket and calls back on its own
//! threads, one per connection. Each callback packs its request into an
//! `Exchange`, sends it over a channel and blocks until the response bytes
//! come back. `ChannelRuntime` sits on the other end of that channel, so
//! `accept` can pull requests one at a time.

use crate::fastcgi::{Params, Runtime};

use std::io::{self, Cursor, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

/// One request in flight between a connection thread and the runtime
pub struct Exchange {
    pub params: Params,
    /// The whole request body
    pub input: Vec<u8>,
    /// Receives the whole response once the request is finished
    pub reply: Sender<Vec<u8>>
}

struct Current {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
    reply: Sender<Vec<u8>>
}

/// Serves the exchanges arriving on a channel, in order
pub struct ChannelRuntime {
    incoming: Receiver<Exchange>,
    current: Option<Current>,
    params: Params
}

/// Starts accepting FastCGI connections on the listening socket the web
/// server passed as standard input.
pub fn listen() -> ChannelRuntime {
    let (sender, incoming) = mpsc::channel();
    let sender = Mutex::new(sender);

    thread::spawn(move || {
        ::fastcgi::run(move |mut req| relay(&sender, &mut req));
    });

    ChannelRuntime::new(incoming)
}

fn relay(sender: &Mutex<Sender<Exchange>>, req: &mut ::fastcgi::Request) {
    let params: Params = req.params().collect();

    let mut input = Vec::new();
    if let Err(e) = req.stdin().read_to_end(&mut input) {
        warn!("Could not read a request body from the web server: {}", e);
        return;
    }

    let (reply, response) = mpsc::channel();
    let sent = match sender.lock() {
        Ok(sender) => sender.send(Exchange {
            params: params,
            input: input,
            reply: reply
        }).is_ok(),
        Err(_) => false
    };
    if !sent {
        debug!("Runtime is gone; dropping a request");
        return;
    }

    // A closed reply channel means the request was never answered
    if let Ok(output) = response.recv() {
        if let Err(e) = req.stdout().write_all(&output) {
            warn!("Could not send a response to the web server: {}", e);
        }
    }
}

impl ChannelRuntime {
    pub fn new(incoming: Receiver<Exchange>) -> ChannelRuntime {
        ChannelRuntime {
            incoming: incoming,
            current: None,
            params: Params::new()
        }
    }

    fn finish(&mut self) {
        if let Some(current) = self.current.take() {
            // The connection may already be closed; nobody is left to tell
            let _ = current.reply.send(current.output);
        }
        self.params.clear();
    }

    fn current(&mut self) -> io::Result<&mut Current> {
        match self.current {
            Some(ref mut current) => Ok(current),
            None => Err(io::Error::new(io::ErrorKind::NotConnected,
                                       "no request is being served"))
        }
    }
}

impl Runtime for ChannelRuntime {
    fn accept(&mut self) -> io::Result<bool> {
        self.finish();

        match self.incoming.recv() {
            Ok(exchange) => {
                self.params = exchange.params;
                self.current = Some(Current {
                    input: Cursor::new(exchange.input),
                    output: Vec::new(),
                    reply: exchange.reply
                });
                Ok(true)
            },
            Err(_) => Ok(false)
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.current()?.input.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current()?.output.write(buf)
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

impl Drop for ChannelRuntime {
    fn drop(&mut self) {
        self.finish();
    }
}
