use crate::{ClientRequest, Error, ErrorKind};
use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use std::thread;
use tokio::net::TcpStream;

///
/// Sends a client request and returns its response. This is the seam a client under test talks
/// through: `MockTransport` answers from the declared expectations, `HttpTransport` goes over
/// the network.
///
pub trait Transport: Send + Sync {
    /// Executes the request.
    fn execute(&self, request: &ClientRequest) -> Result<Response<Bytes>, Error>;
}

///
/// A plain HTTP/1.1 transport. Every request opens a new connection to the host of its absolute
/// `http://` URI.
///
/// Each exchange runs on its own thread and runtime, so the transport can be used both from
/// synchronous code and from within an async runtime.
///
#[derive(Clone, Debug, Default)]
pub struct HttpTransport;

impl HttpTransport {
    /// Creates the transport.
    pub fn new() -> Self {
        HttpTransport
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ClientRequest) -> Result<Response<Bytes>, Error> {
        let request = request.clone();
        let join = thread::Builder::new()
            .name(format!("restmock::transport_{}", request.uri()))
            .spawn(move || -> Result<Response<Bytes>, Error> {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(exchange(request))
            })
            .map_err(|err| Error::new_with_context(ErrorKind::ResponseFailure, err))?;

        join.join()
            .map_err(|_| Error::new(ErrorKind::ResponseFailure))?
    }
}

async fn exchange(request: ClientRequest) -> Result<Response<Bytes>, Error> {
    let uri = request.uri();
    if uri.scheme_str() != Some("http") {
        return Err(Error::new_with_context(
            ErrorKind::Configuration,
            format!("only absolute http:// URIs can be executed, got {}", uri),
        ));
    }

    let authority = uri
        .authority()
        .ok_or_else(|| Error::new_with_context(ErrorKind::Configuration, "missing host"))?
        .clone();
    let address = format!("{}:{}", authority.host(), authority.port_u16().unwrap_or(80));

    let stream = TcpStream::connect(&address).await?;
    let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|err| Error::new_with_context(ErrorKind::Io, err))?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::warn!("Connection to {} failed: {}", address, err);
        }
    });

    let path_and_query = uri
        .path_and_query()
        .map(|value| value.as_str())
        .unwrap_or("/");

    let mut builder = http::Request::builder()
        .method(request.method().clone())
        .uri(path_and_query);
    for (name, value) in request.headers() {
        builder = builder.header(name, value);
    }
    if !request.headers().contains_key(header::HOST) {
        let host = HeaderValue::from_str(authority.as_str())
            .map_err(|err| Error::new_with_context(ErrorKind::Configuration, err))?;
        builder = builder.header(header::HOST, host);
    }

    let outgoing = builder
        .body(Full::new(request.body().clone()))
        .map_err(|err| Error::new_with_context(ErrorKind::Configuration, err))?;

    let response = sender
        .send_request(outgoing)
        .await
        .map_err(|err| Error::new_with_context(ErrorKind::Io, err))?;

    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|err| Error::new_with_context(ErrorKind::ResponseFailure, err))?
        .to_bytes();

    Ok(Response::from_parts(parts, body))
}
