// HTTP status codes used by the framework and the tutorial apps

macro_rules! statuses {
    ($($name:ident = $code:literal, $reason:literal;)+) => {
        /// Status codes a route can declare or the dispatcher can produce.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HttpStatus {
            $($name = $code,)+
        }

        impl HttpStatus {
            /// Canonical reason phrase
            pub fn reason(&self) -> &'static str {
                match self {
                    $(HttpStatus::$name => $reason,)+
                }
            }
        }

        #[cfg(test)]
        const ALL: &[HttpStatus] = &[$(HttpStatus::$name,)+];
    };
}

statuses! {
    Ok = 200, "OK";
    Created = 201, "Created";
    Accepted = 202, "Accepted";
    NoContent = 204, "No Content";
    MovedPermanently = 301, "Moved Permanently";
    Found = 302, "Found";
    SeeOther = 303, "See Other";
    TemporaryRedirect = 307, "Temporary Redirect";
    PermanentRedirect = 308, "Permanent Redirect";
    BadRequest = 400, "Bad Request";
    NotFound = 404, "Not Found";
    MethodNotAllowed = 405, "Method Not Allowed";
    Conflict = 409, "Conflict";
    InternalServerError = 500, "Internal Server Error";
    ServiceUnavailable = 503, "Service Unavailable";
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        self.code() / 100 == 4
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        self.code() / 100 == 5
    }
}

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}
