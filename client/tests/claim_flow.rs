//! End-to-end claim flows: booth issuance through wallet submission to the ledger.

use std::sync::Arc;
use std::time::Duration;

use claim_client::{ClaimClient, ClientConfig, ClientError};
use claim_crypto::{generate_keypair, hash_email};
use claim_issuer::{issue, IssuanceDesk};
use claim_ledger::{ClaimLedger, LedgerConfig, LedgerError, LedgerEvent};
use claim_nullables::{NullClock, NullRandom, NullReader, NullWallet};
use claim_registry::{GiftKind, MemoryRegistry, WinnerRegistry};
use claim_types::{Address, KeyPair, NetworkId, Nonce, Timestamp, TokenAmount};

const OWNER: Address = Address::new([0x0a; 20]);
const CONTRACT: Address = Address::new([0xcc; 20]);
const WINNER: Address = Address::new([0xaa; 20]);
const STRANGER: Address = Address::new([0xbb; 20]);
const NETWORK: NetworkId = NetworkId::BaseSepolia;

struct World {
    ledger: Arc<ClaimLedger>,
    authority: KeyPair,
}

fn world(pool_tokens: u128) -> World {
    let authority = generate_keypair();
    let ledger = Arc::new(ClaimLedger::new(LedgerConfig::new(OWNER, authority.address)).unwrap());
    if pool_tokens > 0 {
        ledger
            .fund(&OWNER, TokenAmount::from_tokens(pool_tokens))
            .unwrap();
    }
    World { ledger, authority }
}

fn code_for(w: &World, email: &str, recipient: &Address, nonce: u64) -> String {
    issue(email, recipient, Nonce::from(nonce), &w.authority.private)
        .unwrap()
        .claim_code()
        .format()
}

fn client(w: &World, wallet: NullWallet) -> ClaimClient<NullWallet, Arc<ClaimLedger>> {
    ClaimClient::new(
        ClientConfig::new(NETWORK, CONTRACT),
        wallet,
        Arc::clone(&w.ledger),
    )
}

fn wallet(w: &World, account: Address) -> NullWallet {
    NullWallet::connected(account, NETWORK, Arc::clone(&w.ledger))
}

#[tokio::test]
async fn winner_claims_once() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let c = client(&w, wallet(&w, WINNER));

    let outcome = c.submit("w@x.com", &WINNER, &code).await.unwrap();

    assert_eq!(outcome.recipient, WINNER);
    assert!(outcome
        .explorer_link
        .unwrap()
        .starts_with("https://sepolia.basescan.org/tx/0x"));
    assert_eq!(w.ledger.get_balance(), TokenAmount::from_tokens(9));
    assert_eq!(w.ledger.balance_of(&WINNER), TokenAmount::from_tokens(1));
    assert!(w.ledger.has_email_claimed(&hash_email("w@x.com").unwrap()));

    // Replaying the code is caught by the pre-check.
    assert!(matches!(
        c.submit("w@x.com", &WINNER, &code).await,
        Err(ClientError::Ledger(LedgerError::AlreadyClaimed))
    ));
}

#[tokio::test]
async fn replay_without_precheck_is_rejected_by_ledger() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let fast = client(&w, wallet(&w, WINNER));
    fast.submit("w@x.com", &WINNER, &code).await.unwrap();

    // Pre-checks fail open; the ledger still refuses the second claim.
    let blind = ClaimClient::new(
        ClientConfig::new(NETWORK, CONTRACT),
        wallet(&w, WINNER),
        NullReader::default(),
    );
    assert!(matches!(
        blind.submit("w@x.com", &WINNER, &code).await,
        Err(ClientError::Ledger(LedgerError::AlreadyClaimed))
    ));
    assert_eq!(w.ledger.get_balance(), TokenAmount::from_tokens(9));
}

#[tokio::test]
async fn wrong_wallet_is_rejected_before_broadcast() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let stranger_wallet = wallet(&w, STRANGER);
    let c = client(&w, stranger_wallet);

    assert!(matches!(
        c.submit("w@x.com", &WINNER, &code).await,
        Err(ClientError::AddressMismatch { wallet, recipient })
            if wallet == STRANGER && recipient == WINNER
    ));
    assert!(!w.ledger.has_email_claimed(&hash_email("w@x.com").unwrap()));

    // Rewriting the recipient to the stranger's own address breaks the signature.
    assert!(matches!(
        c.submit("w@x.com", &STRANGER, &code).await,
        Err(ClientError::Ledger(LedgerError::InvalidSignature))
    ));
    assert_eq!(w.ledger.balance_of(&STRANGER), TokenAmount::ZERO);
}

#[tokio::test]
async fn nonce_reuse_across_identities() {
    let w = world(10);
    let first = code_for(&w, "a@x.com", &WINNER, 7);
    let second = code_for(&w, "b@x.com", &WINNER, 7);
    let blind = ClaimClient::new(
        ClientConfig::new(NETWORK, CONTRACT),
        wallet(&w, WINNER),
        NullReader::default(),
    );

    blind.submit("a@x.com", &WINNER, &first).await.unwrap();
    assert!(matches!(
        blind.submit("b@x.com", &WINNER, &second).await,
        Err(ClientError::Ledger(LedgerError::NonceReused))
    ));
}

#[tokio::test]
async fn empty_pool_reports_insufficient() {
    let w = world(0);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let c = client(&w, wallet(&w, WINNER));

    assert!(matches!(
        c.submit("w@x.com", &WINNER, &code).await,
        Err(ClientError::Ledger(LedgerError::InsufficientPool))
    ));
    assert!(!w.ledger.has_email_claimed(&hash_email("w@x.com").unwrap()));
    assert!(!w.ledger.is_nonce_used(&Nonce::from(42u64)));
}

#[tokio::test]
async fn disconnected_wallet() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let c = client(&w, NullWallet::disconnected());
    assert!(matches!(
        c.submit("w@x.com", &WINNER, &code).await,
        Err(ClientError::WalletNotConnected)
    ));
}

#[tokio::test]
async fn wallet_is_switched_to_configured_network() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let c = client(&w, wallet(&w, WINNER).with_chain(NetworkId::Base.chain_id()));

    c.submit("w@x.com", &WINNER, &code).await.unwrap();
    assert_eq!(w.ledger.balance_of(&WINNER), TokenAmount::from_tokens(1));
}

#[tokio::test]
async fn refused_switch_is_wrong_network() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let c = client(
        &w,
        wallet(&w, WINNER)
            .with_chain(NetworkId::Base.chain_id())
            .refusing_switch(),
    );

    assert!(matches!(
        c.submit("w@x.com", &WINNER, &code).await,
        Err(ClientError::WrongNetwork { expected: NETWORK, actual: 8453 })
    ));
    assert!(!w.ledger.has_email_claimed(&hash_email("w@x.com").unwrap()));
}

#[tokio::test]
async fn slow_inclusion_is_unconfirmed() {
    let w = world(10);
    let code = code_for(&w, "w@x.com", &WINNER, 42);
    let mut config = ClientConfig::new(NETWORK, CONTRACT);
    config.confirmation_timeout = Duration::from_millis(50);
    let c = ClaimClient::new(
        config,
        NullWallet::never_confirms(WINNER, NETWORK),
        Arc::clone(&w.ledger),
    );

    let err = c.submit("w@x.com", &WINNER, &code).await.unwrap_err();
    assert!(matches!(err, ClientError::Unconfirmed { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_code_never_reaches_wallet() {
    let w = world(10);
    let c = client(&w, wallet(&w, WINNER));
    assert!(matches!(
        c.submit("w@x.com", &WINNER, "0xdeadbeef").await,
        Err(ClientError::Claim(_))
    ));
}

#[tokio::test]
async fn booth_to_wallet() {
    let authority = generate_keypair();
    let mut ledger = ClaimLedger::new(LedgerConfig::new(OWNER, authority.address)).unwrap();
    let claimed = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&claimed);
    ledger.subscribe(Box::new(move |event| {
        if let LedgerEvent::RewardClaimed { identity, .. } = event {
            sink.lock().unwrap().push(*identity);
        }
    }));
    ledger.fund(&OWNER, TokenAmount::from_tokens(10)).unwrap();
    let ledger = Arc::new(ledger);

    let registry = MemoryRegistry::new();
    registry.register("w@x.com", Timestamp::new(1)).await.unwrap();
    registry.record_gift("w@x.com", GiftKind::Usdc).await.unwrap();

    let desk = IssuanceDesk::new(
        registry,
        Arc::clone(&ledger),
        NullClock::new(1_700_000_000),
        authority,
    );
    let mut rng = NullRandom::rolls(1_000_000_000, &[123_456]);
    let outcome = desk.issue("w@x.com", &WINNER, &mut rng).await.unwrap();
    assert_eq!(outcome.code().nonce, Nonce::from(123_456u64));

    let code = outcome.code().format_versioned();
    let c = ClaimClient::new(
        ClientConfig::new(NETWORK, CONTRACT),
        NullWallet::connected(WINNER, NETWORK, Arc::clone(&ledger)),
        Arc::clone(&ledger),
    );
    c.submit("w@x.com", &WINNER, &code).await.unwrap();

    assert_eq!(*claimed.lock().unwrap(), vec![hash_email("w@x.com").unwrap()]);
    assert!(desk.reconcile("w@x.com").await.unwrap());
}
