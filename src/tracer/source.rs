use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use crate::flow::RECORD_SIZE;

/// Blocking reader of raw probe events.
pub trait Source: Send + Sync {
    fn read(&self) -> Result<Vec<u8>, ReadError>;

    /// Unblocks pending and future reads, which then return `ReadError::Closed`.
    fn close(&self);
}

#[derive(Debug)]
pub enum ReadError {
    Closed,
    Io(io::Error),
}

impl std::error::Error for ReadError {}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadError::Closed => write!(f, "source closed"),
            ReadError::Io(e)  => write!(f, "reading source: {}", e),
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => ReadError::Closed,
            _                            => ReadError::Io(err),
        }
    }
}

/// Fixed-size events read back to back from a file or FIFO. The file is
/// read in non-blocking mode and waits in `poll` alongside a wakeup socket,
/// so `close` interrupts a read stuck on a quiet FIFO.
pub struct FileSource {
    file:   Mutex<BufReader<File>>,
    wake:   UnixStream,
    waker:  UnixStream,
    closed: AtomicBool,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        nonblocking(file.as_raw_fd())?;

        let (waker, wake) = UnixStream::pair()?;
        waker.set_nonblocking(true)?;

        Ok(Self {
            file:   Mutex::new(BufReader::new(file)),
            wake:   wake,
            waker:  waker,
            closed: AtomicBool::new(false),
        })
    }

    fn wait(&self, fd: RawFd) -> Result<(), ReadError> {
        let mut fds = [
            libc::pollfd { fd: fd,                    events: libc::POLLIN, revents: 0 },
            libc::pollfd { fd: self.wake.as_raw_fd(), events: libc::POLLIN, revents: 0 },
        ];

        let n = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(ReadError::Io(err));
            }
        }

        Ok(())
    }
}

impl Source for FileSource {
    fn read(&self) -> Result<Vec<u8>, ReadError> {
        let mut file = self.file.lock();
        let mut buf  = vec![0u8; RECORD_SIZE];
        let mut read = 0;

        while read < buf.len() {
            if self.closed.load(Ordering::Acquire) {
                return Err(ReadError::Closed);
            }

            match file.read(&mut buf[read..]) {
                Ok(0)  => return Err(ReadError::Closed),
                Ok(n)  => read += n,
                Err(e) => match e.kind() {
                    io::ErrorKind::WouldBlock  => self.wait(file.get_ref().as_raw_fd())?,
                    io::ErrorKind::Interrupted => continue,
                    _                          => return Err(e.into()),
                },
            }
        }

        Ok(buf)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let _ = (&self.waker).write(&[1]);
    }
}

fn nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 || unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
