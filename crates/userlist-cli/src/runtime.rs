// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use userlist_app::{LoadError, User};
use userlist_source::Client;

/// Loads users from the configured HTTP endpoint.
pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl userlist_tui::AppRuntime for HttpRuntime {
    fn describe_source(&self) -> String {
        self.client.endpoint().to_owned()
    }

    fn load_users(&mut self) -> Result<Vec<User>, LoadError> {
        self.client.fetch_all_users()
    }
}

/// Serves the seeded fixture users without touching the network.
pub struct DemoRuntime {
    users: Vec<User>,
}

impl Default for DemoRuntime {
    fn default() -> Self {
        Self {
            users: userlist_testkit::demo_users(),
        }
    }
}

impl userlist_tui::AppRuntime for DemoRuntime {
    fn describe_source(&self) -> String {
        format!("demo ({} users)", self.users.len())
    }

    fn load_users(&mut self) -> Result<Vec<User>, LoadError> {
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, HttpRuntime};
    use anyhow::{Result, anyhow};
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Response, Server};
    use userlist_app::LoadErrorKind;
    use userlist_source::Client;
    use userlist_testkit::{DEMO_USER_COUNT, alice_bob, users_json};
    use userlist_tui::AppRuntime;

    #[test]
    fn http_runtime_loads_users_from_endpoint() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}/users", server.server_addr());
        let body = users_json(&alice_bob());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            request
                .respond(Response::from_string(body))
                .expect("response should succeed");
        });

        let mut runtime = HttpRuntime::new(Client::new(&addr, Duration::from_secs(1))?);
        assert_eq!(runtime.describe_source(), addr);
        let users = runtime.load_users()?;
        assert_eq!(users, alice_bob());

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn http_runtime_reports_unreachable_endpoint() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1/users", Duration::from_millis(200))?;
        let mut runtime = HttpRuntime::new(client);
        let error = runtime
            .load_users()
            .expect_err("unreachable endpoint should fail");
        assert_eq!(error.kind(), LoadErrorKind::Network);
        Ok(())
    }

    #[test]
    fn demo_runtime_serves_seeded_users() -> Result<()> {
        let mut runtime = DemoRuntime::default();
        let first = runtime.load_users()?;
        assert_eq!(first.len(), DEMO_USER_COUNT);
        assert_eq!(runtime.load_users()?, first, "reloads are stable");
        assert_eq!(
            runtime.describe_source(),
            format!("demo ({DEMO_USER_COUNT} users)")
        );
        Ok(())
    }
}
