//! Tello SDK link over UDP.
//!
//! The drone listens for plain-text commands on 192.168.10.1:8889 and answers
//! each one from the same address with `ok`, `error ...`, or the value of a
//! `?` query. Replies go to whichever local port sent the command.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{DroneControl, FlipDirection};
use crate::error::{PilotError, Result};

/// Configuration for a [`TelloLink`].
#[derive(Debug, Clone)]
pub struct TelloConfig {
    /// Drone command endpoint.
    pub drone_addr: SocketAddr,
    /// Local UDP port to bind (0 = OS-assigned).
    pub local_port: u16,
    /// How long to wait for a reply to an ordinary command.
    pub response_timeout: Duration,
    /// How long to wait for a reply to `takeoff`.
    pub takeoff_timeout: Duration,
    /// Minimum spacing between consecutive commands.
    pub command_interval: Duration,
}

impl Default for TelloConfig {
    fn default() -> Self {
        Self {
            drone_addr: SocketAddr::from(([192, 168, 10, 1], 8889)),
            local_port: 8889,
            response_timeout: Duration::from_secs(7),
            takeoff_timeout: Duration::from_secs(20),
            command_interval: Duration::from_millis(100),
        }
    }
}

/// Command channel to a Tello drone.
pub struct TelloLink {
    socket: UdpSocket,
    config: TelloConfig,
    last_command: Option<Instant>,
    ended: bool,
    recv_buf: Vec<u8>,
}

impl TelloLink {
    /// Bind the local command socket. Nothing is sent until [`connect`].
    ///
    /// [`connect`]: DroneControl::connect
    pub fn new(config: TelloConfig) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], config.local_port)))?;
        Ok(Self {
            socket,
            config,
            last_command: None,
            ended: false,
            recv_buf: vec![0u8; 1024],
        })
    }

    /// Address the command socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Send one command and return the drone's trimmed reply.
    ///
    /// Stale datagrams queued before the command are discarded first so a
    /// late reply to an earlier command cannot be mistaken for this one.
    pub fn send_command(&mut self, command: &str, timeout: Duration) -> Result<String> {
        if self.ended {
            return Err(PilotError::DroneProtocol(format!(
                "link ended, cannot send `{command}`"
            )));
        }

        self.pace();
        self.drain_stale()?;

        debug!("tello <- {command}");
        self.socket
            .send_to(command.as_bytes(), self.config.drone_addr)?;
        self.last_command = Some(Instant::now());

        let response = self.await_response(command, timeout)?;
        debug!("tello -> {response}");
        Ok(response)
    }

    /// Send a command that must be answered with `ok`.
    fn send_control(&mut self, command: &str, timeout: Duration) -> Result<()> {
        let response = self.send_command(command, timeout)?;
        if response.eq_ignore_ascii_case("ok") {
            Ok(())
        } else {
            Err(PilotError::DroneRejected {
                command: command.to_string(),
                response,
            })
        }
    }

    /// Send a `?` query and return its value.
    fn send_query(&mut self, command: &str) -> Result<String> {
        let response = self.send_command(command, self.config.response_timeout)?;
        if response.to_ascii_lowercase().starts_with("error") {
            return Err(PilotError::DroneRejected {
                command: command.to_string(),
                response,
            });
        }
        Ok(response)
    }

    fn pace(&self) {
        if let Some(last) = self.last_command {
            let elapsed = last.elapsed();
            if elapsed < self.config.command_interval {
                std::thread::sleep(self.config.command_interval - elapsed);
            }
        }
    }

    fn drain_stale(&mut self) -> Result<()> {
        self.socket.set_nonblocking(true)?;
        let drained = loop {
            match self.socket.recv_from(&mut self.recv_buf) {
                Ok(_) => continue,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.socket.set_nonblocking(false)?;
        Ok(drained?)
    }

    fn await_response(&mut self, command: &str, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(PilotError::DroneTimeout(command.to_string()));
            }
            self.socket.set_read_timeout(Some(remaining))?;

            match self.socket.recv_from(&mut self.recv_buf) {
                Ok((len, addr)) if addr == self.config.drone_addr => {
                    let text = String::from_utf8_lossy(&self.recv_buf[..len]);
                    return Ok(text.trim().to_string());
                }
                // Not from the drone; keep waiting.
                Ok(_) => continue,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(PilotError::DroneTimeout(command.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl std::fmt::Debug for TelloLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelloLink")
            .field("drone_addr", &self.config.drone_addr)
            .field("local_addr", &self.socket.local_addr().ok())
            .field("ended", &self.ended)
            .finish()
    }
}

impl DroneControl for TelloLink {
    fn kind(&self) -> &'static str {
        "tello"
    }

    fn connect(&mut self) -> Result<()> {
        self.send_control("command", self.config.response_timeout)?;
        info!("Connected to Tello at {}", self.config.drone_addr);
        Ok(())
    }

    fn battery(&mut self) -> Result<u8> {
        let response = self.send_query("battery?")?;
        response.parse().map_err(|_| {
            PilotError::DroneProtocol(format!("unparseable battery level: {response:?}"))
        })
    }

    fn stream_on(&mut self) -> Result<()> {
        self.send_control("streamon", self.config.response_timeout)
    }

    fn stream_off(&mut self) -> Result<()> {
        self.send_control("streamoff", self.config.response_timeout)
    }

    fn takeoff(&mut self) -> Result<()> {
        self.send_control("takeoff", self.config.takeoff_timeout)
    }

    fn land(&mut self) -> Result<()> {
        self.send_control("land", self.config.response_timeout)
    }

    fn move_up(&mut self, cm: u32) -> Result<()> {
        self.send_control(&format!("up {cm}"), self.config.response_timeout)
    }

    fn flip(&mut self, direction: FlipDirection) -> Result<()> {
        self.send_control(
            &format!("flip {}", direction.code()),
            self.config.response_timeout,
        )
    }

    fn end(&mut self) -> Result<()> {
        self.ended = true;
        info!("Tello link closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Fake drone that answers each received command from `replies`, in
    /// order, and hands back what it received.
    fn fake_drone(replies: Vec<&'static str>) -> (SocketAddr, thread::JoinHandle<Vec<String>>) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            let mut buf = [0u8; 256];
            for reply in replies {
                let (len, from) = socket.recv_from(&mut buf).unwrap();
                seen.push(String::from_utf8_lossy(&buf[..len]).to_string());
                socket.send_to(reply.as_bytes(), from).unwrap();
            }
            seen
        });
        (addr, handle)
    }

    fn link_to(addr: SocketAddr) -> TelloLink {
        TelloLink::new(TelloConfig {
            drone_addr: addr,
            local_port: 0,
            response_timeout: Duration::from_secs(2),
            takeoff_timeout: Duration::from_secs(2),
            command_interval: Duration::from_millis(1),
        })
        .unwrap()
    }

    #[test]
    fn test_link_creation() {
        let link = link_to("127.0.0.1:9".parse().unwrap());
        assert!(link.local_addr().unwrap().port() != 0);
    }

    #[test]
    fn test_command_sequence_on_the_wire() {
        let (addr, drone) = fake_drone(vec!["ok", "87\r\n", "ok", "ok", "ok", "ok"]);
        let mut link = link_to(addr);

        link.connect().unwrap();
        assert_eq!(link.battery().unwrap(), 87);
        link.stream_on().unwrap();
        link.takeoff().unwrap();
        link.move_up(50).unwrap();
        link.flip(FlipDirection::Back).unwrap();

        let seen = drone.join().unwrap();
        assert_eq!(
            seen,
            vec!["command", "battery?", "streamon", "takeoff", "up 50", "flip b"]
        );
    }

    #[test]
    fn test_error_reply_is_rejection() {
        let (addr, drone) = fake_drone(vec!["error Not joystick"]);
        let mut link = link_to(addr);

        let err = link.land().unwrap_err();
        match err {
            PilotError::DroneRejected { command, response } => {
                assert_eq!(command, "land");
                assert_eq!(response, "error Not joystick");
            }
            other => panic!("unexpected error: {other}"),
        }
        drone.join().unwrap();
    }

    #[test]
    fn test_unparseable_battery() {
        let (addr, drone) = fake_drone(vec!["ok"]);
        let mut link = link_to(addr);
        assert!(matches!(
            link.battery(),
            Err(PilotError::DroneProtocol(_))
        ));
        drone.join().unwrap();
    }

    #[test]
    fn test_silent_drone_times_out() {
        // Bound but never answers.
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut link = TelloLink::new(TelloConfig {
            drone_addr: silent.local_addr().unwrap(),
            local_port: 0,
            response_timeout: Duration::from_millis(50),
            ..TelloConfig::default()
        })
        .unwrap();

        assert!(matches!(
            link.connect(),
            Err(PilotError::DroneTimeout(ref c)) if c == "command"
        ));
    }

    #[test]
    fn test_commands_after_end_fail() {
        let mut link = link_to("127.0.0.1:9".parse().unwrap());
        link.end().unwrap();
        assert!(matches!(
            link.takeoff(),
            Err(PilotError::DroneProtocol(_))
        ));
    }
}
